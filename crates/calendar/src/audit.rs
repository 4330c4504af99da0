//! Coverage audit: runs every calendar event of a span of Hebrew years through
//! the pattern store and reports which ones no tag covers.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::adapter::{CalendarAdapter, HolidayCategory, TransliterationStyle};
use crate::catalog::{CatalogIssue, TagCatalog, TagType};
use crate::error::StoreError;
use crate::hdate::HDate;
use crate::resolver::TagResolver;

/// A place whose calendar is audited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_israel: bool,
}

/// One Israel and one Diaspora location, so both festival schedules are
/// covered.
pub fn audit_locations() -> Vec<AuditLocation> {
    vec![
        AuditLocation {
            name: "Jerusalem".into(),
            latitude: 31.7683,
            longitude: 35.2137,
            is_israel: true,
        },
        AuditLocation {
            name: "Salford".into(),
            latitude: 53.4875,
            longitude: -2.2901,
            is_israel: false,
        },
    ]
}

/// A calendar event seen while collecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub title: String,
    pub category: HolidayCategory,
    pub date: NaiveDate,
    pub hebrew_date: HDate,
    pub location: String,
    pub is_israel: bool,
}

/// Tracks which (title, category, location) triples were already seen. The
/// same event on another date counts once.
#[derive(Debug, Default)]
pub struct EventDeduplicator {
    seen: HashSet<(String, HolidayCategory, String)>,
}

impl EventDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a triple is added.
    pub fn add(&mut self, title: &str, category: HolidayCategory, location: &str) -> bool {
        self.seen
            .insert((title.to_string(), category, location.to_string()))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Collects every event of `years` at each location, in the untransformed
/// vocabulary stored patterns are written against.
pub fn collect_events(
    adapter: &CalendarAdapter,
    years: impl IntoIterator<Item = i32> + Clone,
    locations: &[AuditLocation],
) -> Vec<AuditEvent> {
    let mut events = Vec::new();
    for location in locations {
        for year in years.clone() {
            for (hebrew_date, holiday) in
                adapter.holidays_for_year(year, TransliterationStyle::Sephardi, location.is_israel)
            {
                events.push(AuditEvent {
                    title: holiday.original_name,
                    category: holiday.category,
                    date: hebrew_date.to_gregorian(),
                    hebrew_date,
                    location: location.name.clone(),
                    is_israel: location.is_israel,
                });
            }
        }
    }
    info!(count = events.len(), locations = locations.len(), "Collected calendar events");
    events
}

/// An event no tag covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedEvent {
    pub title: String,
    pub category: HolidayCategory,
    pub first_date: NaiveDate,
    pub occurrences: usize,
    pub locations: BTreeSet<String>,
}

/// Coverage of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCoverage {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
}

/// Result of [`run_audit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    /// Events fed in, duplicates included.
    pub total_events: usize,
    /// Distinct (title, category, location) triples.
    pub unique_events: usize,
    pub mapped: usize,
    pub unmapped: usize,
    pub coverage_percent: f64,
    /// Winning match type of each mapped unique event.
    pub by_match_type: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, CategoryCoverage>,
    /// Most frequent first.
    pub unmapped_events: Vec<UnmappedEvent>,
    /// Tag keys that won at least one event.
    pub matched_tags: BTreeSet<String>,
    /// Event tags of the catalog that no audited event reached.
    pub unused_tags: Vec<String>,
    pub catalog_issues: Vec<CatalogIssue>,
}

impl AuditReport {
    /// Adds the catalog's validation findings and its unreached event tags.
    pub fn with_catalog(mut self, catalog: &TagCatalog) -> Self {
        self.catalog_issues = catalog.validate();
        self.unused_tags = catalog
            .tags
            .iter()
            .filter(|tag| tag.tag_type == TagType::Event)
            .filter(|tag| !self.matched_tags.contains(&tag.key))
            .map(|tag| tag.key.clone())
            .collect();
        if !self.unused_tags.is_empty() {
            info!(count = self.unused_tags.len(), tags = ?self.unused_tags, "Unused event tags");
        }
        self
    }

    pub fn is_fully_covered(&self) -> bool {
        self.unmapped == 0
    }
}

/// Matches each distinct event once and tallies coverage. Store failures
/// abort the audit.
pub async fn run_audit(
    resolver: &TagResolver,
    events: &[AuditEvent],
) -> Result<AuditReport, StoreError> {
    let mut dedup = EventDeduplicator::new();
    let mut mapped = 0;
    let mut by_match_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_category: BTreeMap<String, CategoryCoverage> = BTreeMap::new();
    let mut matched_tags = BTreeSet::new();
    let mut unmapped: BTreeMap<(String, HolidayCategory), UnmappedEvent> = BTreeMap::new();

    for event in events {
        let key = (event.title.clone(), event.category);
        if !dedup.add(&event.title, event.category, &event.location) {
            if let Some(entry) = unmapped.get_mut(&key) {
                entry.occurrences += 1;
            }
            continue;
        }

        let resolution = resolver
            .resolve(&event.title, event.category, &event.hebrew_date, event.is_israel)
            .await?;
        let coverage = by_category
            .entry(event.category.as_str().to_string())
            .or_default();
        coverage.total += 1;

        match resolution {
            Some(resolution) => {
                mapped += 1;
                coverage.mapped += 1;
                *by_match_type
                    .entry(resolution.tag.match_type.as_str().to_string())
                    .or_default() += 1;
                matched_tags.insert(resolution.tag.tag_key);
            }
            None => {
                coverage.unmapped += 1;
                let entry = unmapped.entry(key).or_insert_with(|| UnmappedEvent {
                    title: event.title.clone(),
                    category: event.category,
                    first_date: event.date,
                    occurrences: 0,
                    locations: BTreeSet::new(),
                });
                entry.occurrences += 1;
                entry.locations.insert(event.location.clone());
            }
        }
    }

    let unique_events = dedup.len();
    let unmapped_titles = unmapped.len();
    let mut unmapped_events: Vec<UnmappedEvent> = unmapped.into_values().collect();
    unmapped_events.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.title.cmp(&b.title))
    });

    let coverage_percent = if unique_events == 0 {
        100.0
    } else {
        mapped as f64 / unique_events as f64 * 100.0
    };

    info!(
        unique_events,
        mapped,
        unmapped_titles,
        coverage_percent,
        "Audit finished"
    );

    Ok(AuditReport {
        total_events: events.len(),
        unique_events,
        mapped,
        unmapped: unique_events - mapped,
        coverage_percent,
        by_match_type,
        by_category,
        unmapped_events,
        matched_tags,
        unused_tags: Vec::new(),
        catalog_issues: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::TagCatalog;
    use crate::hdate::HMonth;
    use crate::store::MemoryPatternStore;

    const CATALOG: &str = r#"
        [[tag]]
        key = "purim"
        display_name_hebrew = "פורים"
        display_name_english_ashkenazi = "Purim"

        [[tag.pattern]]
        match_type = "exact"
        value = "Purim"
    "#;

    fn event(title: &str, category: HolidayCategory, location: &str, day: u8) -> AuditEvent {
        let hebrew_date = HDate::new(5786, HMonth::Adar1, day).unwrap();
        AuditEvent {
            title: title.into(),
            category,
            date: hebrew_date.to_gregorian(),
            hebrew_date,
            location: location.into(),
            is_israel: false,
        }
    }

    fn resolver() -> TagResolver {
        let catalog = TagCatalog::from_toml(CATALOG).unwrap();
        TagResolver::new(Arc::new(MemoryPatternStore::new(catalog)))
    }

    #[test]
    fn deduplicates_by_title_category_location() {
        let mut dedup = EventDeduplicator::new();
        assert!(dedup.add("Purim", HolidayCategory::Minor, "Salford"));
        assert!(!dedup.add("Purim", HolidayCategory::Minor, "Salford"));
        assert!(dedup.add("Purim", HolidayCategory::Minor, "Jerusalem"));
        assert!(dedup.add("Purim", HolidayCategory::Major, "Salford"));
        assert_eq!(dedup.len(), 3);
    }

    #[tokio::test]
    async fn reports_unmapped_events() {
        let events = [
            event("Purim", HolidayCategory::Minor, "Salford", 14),
            event("Purim", HolidayCategory::Minor, "Salford", 14),
            event("Shushan Purim", HolidayCategory::Minor, "Salford", 15),
            event("Shushan Purim", HolidayCategory::Minor, "Jerusalem", 15),
            event("Erev Purim", HolidayCategory::Minor, "Salford", 13),
        ];
        let report = run_audit(&resolver(), &events).await.unwrap();

        assert_eq!(report.total_events, 5);
        assert_eq!(report.unique_events, 4);
        assert_eq!(report.mapped, 1);
        assert_eq!(report.unmapped, 3);
        assert_eq!(report.coverage_percent, 25.0);
        assert_eq!(report.by_match_type.get("exact"), Some(&1));
        assert_eq!(report.by_category["minor"].total, 4);

        let first = &report.unmapped_events[0];
        assert_eq!(first.title, "Shushan Purim");
        assert_eq!(first.occurrences, 2);
        assert_eq!(first.locations.len(), 2);
        assert!(!report.is_fully_covered());
    }

    #[tokio::test]
    async fn lists_event_tags_no_event_reached() {
        let extra = r#"
            [[tag]]
            key = "purim_katan"
            display_name_hebrew = "פורים קטן"
            display_name_english_ashkenazi = "Purim Katan"

            [[tag.pattern]]
            match_type = "exact"
            value = "Purim Katan"

            [[tag]]
            key = "minor_day"
            tag_type = "category"
            display_name_hebrew = "יום קטן"
            display_name_english_ashkenazi = "Minor day"
        "#;
        let catalog = TagCatalog::from_toml(&format!("{CATALOG}{extra}")).unwrap();
        let resolver = TagResolver::new(Arc::new(MemoryPatternStore::new(catalog.clone())));

        let events = [event("Purim", HolidayCategory::Minor, "Salford", 14)];
        let report = run_audit(&resolver, &events).await.unwrap().with_catalog(&catalog);

        assert_eq!(report.matched_tags, BTreeSet::from(["purim".to_string()]));
        assert_eq!(report.unused_tags, ["purim_katan"]);
    }

    #[tokio::test]
    async fn report_serializes_to_json() {
        let report = run_audit(&resolver(), &[]).await.unwrap();
        assert_eq!(report.coverage_percent, 100.0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unique_events"], 0);
        assert!(json["unmapped_events"].as_array().unwrap().is_empty());
        assert!(json["unused_tags"].as_array().unwrap().is_empty());
    }
}
