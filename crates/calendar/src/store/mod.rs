//! Pattern stores answer one question: which tags does an event title and
//! category map to, best match first.

mod memory;
mod postgres;

use async_trait::async_trait;
use serde::Serialize;

pub use memory::MemoryPatternStore;
pub use postgres::{PgPatternStore, PgStoreOptions};

use crate::adapter::{HolidayCategory, TransliterationStyle};
use crate::catalog::{FastStartType, HebrewDayRange, Tag};
use crate::error::StoreError;
use crate::pattern::MatchType;

/// Per-tag facts the resolver needs besides the tag itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventMetadata {
    pub duration_days_israel: u8,
    pub duration_days_diaspora: u8,
    pub fast_start_type: Option<FastStartType>,
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self {
            duration_days_israel: 1,
            duration_days_diaspora: 1,
            fast_start_type: None,
        }
    }
}

impl EventMetadata {
    pub fn total_days(&self, is_israel: bool) -> u8 {
        if is_israel {
            self.duration_days_israel
        } else {
            self.duration_days_diaspora
        }
    }
}

impl From<&Tag> for EventMetadata {
    fn from(tag: &Tag) -> Self {
        Self {
            duration_days_israel: tag.duration_days_israel,
            duration_days_diaspora: tag.duration_days_diaspora,
            fast_start_type: tag.fast_start_type,
        }
    }
}

/// A tag whose pattern matched an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMatch {
    pub tag_key: String,
    pub display_name_hebrew: String,
    pub display_name_english_ashkenazi: String,
    pub display_name_english_sephardi: Option<String>,
    pub match_type: MatchType,
    pub priority: i32,
    pub metadata: EventMetadata,
    /// Hebrew-date window of the pattern that matched, if it had one.
    pub date_range: Option<HebrewDayRange>,
}

impl TagMatch {
    /// Ashkenazi name unless Sephardi is requested and the tag has one.
    pub fn english_name(&self, style: TransliterationStyle) -> &str {
        match (style, &self.display_name_english_sephardi) {
            (TransliterationStyle::Sephardi, Some(name)) => name,
            _ => &self.display_name_english_ashkenazi,
        }
    }
}

/// Source of tag matches for calendar events.
///
/// An empty result means "no tag for this event" and is not an error.
#[async_trait]
pub trait PatternStore: Send + Sync {
    async fn match_event(
        &self,
        title: &str,
        category: HolidayCategory,
    ) -> Result<Vec<TagMatch>, StoreError>;
}
