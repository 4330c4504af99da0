//! Pattern store that evaluates a tag catalog in-process.

use std::path::Path;

use async_trait::async_trait;

use super::{EventMetadata, PatternStore, TagMatch};
use crate::adapter::HolidayCategory;
use crate::catalog::{HebrewDayRange, Tag, TagCatalog};
use crate::error::{Result, StoreError};
use crate::pattern::{self, Matcher};

/// A compiled pattern.
struct CompiledPattern {
    /// Index into `tags`
    tag: usize,
    matcher: Matcher,
    priority: i32,
    date_range: Option<HebrewDayRange>,
}

/// Evaluates the catalog's patterns in-process.
///
/// Patterns of equal priority and kind keep their catalog order.
pub struct MemoryPatternStore {
    tags: Vec<Tag>,
    patterns: Vec<CompiledPattern>,
}

impl MemoryPatternStore {
    /// Compiles every pattern of `catalog`.
    ///
    /// Patterns that fail to compile are logged and skipped.
    pub fn new(catalog: TagCatalog) -> Self {
        let patterns = catalog
            .tags
            .iter()
            .enumerate()
            .flat_map(|(index, tag)| {
                tag.patterns.iter().filter_map(move |p| {
                    match Matcher::compile(p.match_type, &p.value) {
                        Ok(matcher) => Some(CompiledPattern {
                            tag: index,
                            matcher,
                            priority: p.priority,
                            date_range: p.date_range(),
                        }),
                        Err(e) => {
                            tracing::warn!(tag = %tag.key, pattern = %p.value, error = %e, "Invalid tag pattern, skipping");
                            None
                        }
                    }
                })
            })
            .collect();

        Self {
            tags: catalog.tags,
            patterns,
        }
    }

    pub fn builtin() -> Result<Self> {
        Ok(Self::new(TagCatalog::builtin()?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(TagCatalog::load(path)?))
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Tags matching `title` and `category`, best first.
    pub fn matches(&self, title: &str, category: HolidayCategory) -> Vec<TagMatch> {
        let mut matches: Vec<TagMatch> = self
            .patterns
            .iter()
            .filter(|p| p.matcher.is_match(title, category))
            .map(|p| {
                let tag = &self.tags[p.tag];
                TagMatch {
                    tag_key: tag.key.clone(),
                    display_name_hebrew: tag.display_name_hebrew.clone(),
                    display_name_english_ashkenazi: tag.display_name_english_ashkenazi.clone(),
                    display_name_english_sephardi: tag.display_name_english_sephardi.clone(),
                    match_type: p.matcher.match_type(),
                    priority: p.priority,
                    metadata: EventMetadata::from(tag),
                    date_range: p.date_range,
                }
            })
            .collect();

        pattern::rank_by(&mut matches, |m| (m.priority, m.match_type));
        matches
    }
}

#[async_trait]
impl PatternStore for MemoryPatternStore {
    async fn match_event(
        &self,
        title: &str,
        category: HolidayCategory,
    ) -> std::result::Result<Vec<TagMatch>, StoreError> {
        Ok(self.matches(title, category))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::pattern::MatchType;

    const CATALOG: &str = r#"
        [[tag]]
        key = "purim"
        display_name_hebrew = "פורים"
        display_name_english_ashkenazi = "Purim"

        [[tag.pattern]]
        match_type = "exact"
        value = "Purim"
        priority = 10

        [[tag]]
        key = "purim_group"
        display_name_hebrew = "פורים"
        display_name_english_ashkenazi = "Purim group"

        [[tag.pattern]]
        match_type = "group"
        value = "Purim$"
        priority = 10

        [[tag]]
        key = "minor"
        display_name_hebrew = "x"
        display_name_english_ashkenazi = "Minor"

        [[tag.pattern]]
        match_type = "category"
        value = "minor"
        priority = 10

        [[tag.pattern]]
        match_type = "regex"
        value = "("
        priority = 99
    "#;

    #[tokio::test]
    async fn ranks_by_specificity_on_equal_priority() {
        let store = MemoryPatternStore::new(TagCatalog::from_toml(CATALOG).unwrap());
        let matches = store
            .match_event("Purim", HolidayCategory::Minor)
            .await
            .unwrap();
        let keys: Vec<&str> = matches.iter().map(|m| m.tag_key.as_str()).collect();
        assert_eq!(keys, ["purim", "purim_group", "minor"]);
        assert_eq!(matches[1].match_type, MatchType::Regex);
    }

    #[tokio::test]
    async fn invalid_patterns_are_skipped() {
        let store = MemoryPatternStore::new(TagCatalog::from_toml(CATALOG).unwrap());
        assert_eq!(store.pattern_count(), 3);
    }

    #[tokio::test]
    async fn no_match_is_empty() {
        let store = MemoryPatternStore::new(TagCatalog::from_toml(CATALOG).unwrap());
        let matches = store
            .match_event("Lag BaOmer", HolidayCategory::Major)
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn builtin_maps_observed_fasts() {
        let store = MemoryPatternStore::builtin().unwrap();
        for title in ["Tzom Gedaliah", "Tzom Gedaliah (observed)"] {
            let matches = store.match_event(title, HolidayCategory::Fast).await.unwrap();
            assert_eq!(matches[0].tag_key, "tzom_gedaliah");
            assert_eq!(matches.last().unwrap().tag_key, "fast_day");
        }
    }

    #[test]
    fn load_from_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(CATALOG.as_bytes()).unwrap();

        let store = MemoryPatternStore::load(temp.path()).unwrap();
        assert_eq!(store.matches("Purim", HolidayCategory::Minor).len(), 3);
    }
}
