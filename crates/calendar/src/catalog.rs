//! Tag taxonomy and the patterns that map calendar events onto it.
//!
//! A catalog is a TOML document of `[[tag]]` tables, each carrying its
//! `[[tag.pattern]]` rules. The library ships one built in; deployments can
//! load their own or import one into Postgres.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::hdate::{HDate, HMonth};
use crate::pattern::{self, MatchType, Matcher, TagEventMapping};

const BUILTIN: &str = include_str!("../data/tags.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    #[default]
    Event,
    Category,
    Timing,
    Behavior,
}

impl TagType {
    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Event => "event",
            TagType::Category => "category",
            TagType::Timing => "timing",
            TagType::Behavior => "behavior",
        }
    }
}

/// When a fast begins: at dawn for minor fasts, the previous sunset for
/// Yom Kippur and Tish'a B'Av.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastStartType {
    Dawn,
    Sunset,
}

impl FastStartType {
    pub fn as_str(self) -> &'static str {
        match self {
            FastStartType::Dawn => "dawn",
            FastStartType::Sunset => "sunset",
        }
    }
}

impl std::str::FromStr for FastStartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dawn" => Ok(Self::Dawn),
            "sunset" => Ok(Self::Sunset),
            other => Err(format!("unknown fast start type: {other}")),
        }
    }
}

/// Hebrew-date window a pattern is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HebrewDayRange {
    pub month: HMonth,
    pub day_start: u8,
    pub day_end: u8,
}

impl HebrewDayRange {
    pub fn contains(&self, date: &HDate) -> bool {
        date.month() == self.month && (self.day_start..=self.day_end).contains(&date.day())
    }

    /// 1-based position of `date` within the window.
    pub fn day_number(&self, date: &HDate) -> Option<u8> {
        self.contains(date).then(|| date.day() - self.day_start + 1)
    }
}

/// One matching rule for a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPattern {
    pub match_type: MatchType,
    pub value: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hebrew_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_start: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_end: Option<u8>,
}

impl TagPattern {
    pub fn new(match_type: MatchType, value: impl Into<String>, priority: i32) -> Self {
        Self {
            match_type,
            value: value.into(),
            priority,
            hebrew_month: None,
            day_start: None,
            day_end: None,
        }
    }

    pub fn with_range(mut self, month: HMonth, day_start: u8, day_end: u8) -> Self {
        self.hebrew_month = Some(month.number());
        self.day_start = Some(day_start);
        self.day_end = Some(day_end);
        self
    }

    /// Date window, present when `hebrew_month` names a real month. Missing
    /// bounds span the whole month.
    pub fn date_range(&self) -> Option<HebrewDayRange> {
        let month = HMonth::from_number(self.hebrew_month?)?;
        Some(HebrewDayRange {
            month,
            day_start: self.day_start.unwrap_or(1),
            day_end: self.day_end.unwrap_or(30),
        })
    }
}

fn default_one() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub tag_type: TagType,
    pub display_name_hebrew: String,
    pub display_name_english_ashkenazi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name_english_sephardi: Option<String>,
    /// Hidden tags still match but are left out of user-facing listings.
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_one")]
    pub duration_days_israel: u8,
    #[serde(default = "default_one")]
    pub duration_days_diaspora: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_start_type: Option<FastStartType>,
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<TagPattern>,
}

/// Problem found by [`TagCatalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogIssue {
    EmptyKey,
    DuplicateTag { tag: String },
    EmptyPattern { tag: String },
    DuplicatePattern { tag: String, value: String },
    InvalidPattern { tag: String, value: String, error: String },
    InvalidDateRange { tag: String, value: String },
    ZeroDuration { tag: String },
    NoPatterns { tag: String },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::EmptyKey => write!(f, "tag with empty key"),
            CatalogIssue::DuplicateTag { tag } => write!(f, "{tag}: duplicate tag key"),
            CatalogIssue::EmptyPattern { tag } => write!(f, "{tag}: empty pattern value"),
            CatalogIssue::DuplicatePattern { tag, value } => {
                write!(f, "{tag}: duplicate pattern {value:?}")
            }
            CatalogIssue::InvalidPattern { tag, value, error } => {
                write!(f, "{tag}: invalid pattern {value:?}: {error}")
            }
            CatalogIssue::InvalidDateRange { tag, value } => {
                write!(f, "{tag}: invalid Hebrew date range on {value:?}")
            }
            CatalogIssue::ZeroDuration { tag } => write!(f, "{tag}: duration must be at least 1"),
            CatalogIssue::NoPatterns { tag } => write!(f, "{tag}: event tag has no patterns"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCatalog {
    #[serde(default, rename = "tag")]
    pub tags: Vec<Tag>,
}

impl TagCatalog {
    /// The catalog compiled into the library.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CalendarError::Catalog(e.to_string()))
    }

    pub fn tag(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key == key)
    }

    /// Tags shown to users; hidden tags are skipped.
    pub fn visible_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| t.visible)
    }

    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut keys = HashSet::new();

        for tag in &self.tags {
            if tag.key.trim().is_empty() {
                issues.push(CatalogIssue::EmptyKey);
                continue;
            }
            if !keys.insert(tag.key.as_str()) {
                issues.push(CatalogIssue::DuplicateTag {
                    tag: tag.key.clone(),
                });
            }
            if tag.duration_days_israel == 0 || tag.duration_days_diaspora == 0 {
                issues.push(CatalogIssue::ZeroDuration {
                    tag: tag.key.clone(),
                });
            }
            if tag.tag_type == TagType::Event && tag.patterns.is_empty() {
                issues.push(CatalogIssue::NoPatterns {
                    tag: tag.key.clone(),
                });
            }

            let mut seen = HashSet::new();
            for p in &tag.patterns {
                if p.value.trim().is_empty() {
                    issues.push(CatalogIssue::EmptyPattern {
                        tag: tag.key.clone(),
                    });
                    continue;
                }
                if !seen.insert((p.match_type, p.value.as_str())) {
                    issues.push(CatalogIssue::DuplicatePattern {
                        tag: tag.key.clone(),
                        value: p.value.clone(),
                    });
                }
                if let Err(error) = Matcher::compile(p.match_type, &p.value) {
                    issues.push(CatalogIssue::InvalidPattern {
                        tag: tag.key.clone(),
                        value: p.value.clone(),
                        error,
                    });
                }
                let range_ok = match (p.hebrew_month, p.date_range()) {
                    (None, _) => p.day_start.is_none() && p.day_end.is_none(),
                    (Some(_), None) => false,
                    (Some(_), Some(r)) => 1 <= r.day_start && r.day_start <= r.day_end && r.day_end <= 30,
                };
                if !range_ok {
                    issues.push(CatalogIssue::InvalidDateRange {
                        tag: tag.key.clone(),
                        value: p.value.clone(),
                    });
                }
            }
        }
        issues
    }

    /// Fails with the first validation issue, if any.
    pub fn ensure_valid(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            Some(issue) => Err(CalendarError::Catalog(issue.to_string())),
            None => Ok(()),
        }
    }

    /// Exact and wildcard patterns flattened into `LIKE` mappings.
    pub fn event_mappings(&self) -> Vec<TagEventMapping> {
        self.tags
            .iter()
            .flat_map(|tag| {
                tag.patterns
                    .iter()
                    .filter(|p| matches!(p.match_type, MatchType::Exact | MatchType::Wildcard))
                    .map(|p| TagEventMapping {
                        tag_key: tag.key.clone(),
                        pattern: p.value.clone(),
                        priority: p.priority,
                    })
            })
            .collect()
    }

    /// Distinct tag keys any of `names` maps to, in first-seen order.
    pub fn match_event_to_tags(&self, names: &[&str]) -> Vec<String> {
        pattern::match_event_to_tags(names, &self.event_mappings())
    }
}
