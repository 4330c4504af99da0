//! Resolves a normalized holiday to the tag that represents it, with the
//! day numbering of multi-day events.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::adapter::{HolidayCategory, chanukah_day};
use crate::catalog::FastStartType;
use crate::error::StoreError;
use crate::hdate::HDate;
use crate::store::{PatternStore, TagMatch};

const ROMAN: [&str; 8] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII"];

const CHOL_HAMOED_MARKER: &str = "(CH''M)";

/// Position of one day within its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayPosition {
    pub day_number: u8,
    pub total_days: u8,
    pub is_final_day: bool,
    pub fast_start_type: Option<FastStartType>,
}

/// The winning tag for an event plus its position on the resolved date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub tag: TagMatch,
    pub position: DayPosition,
}

fn roman_value(token: &str) -> Option<u8> {
    ROMAN.iter().position(|r| *r == token).map(|i| i as u8 + 1)
}

/// Roman numeral following the event name ("Pesach VII" is 7).
fn roman_suffix(title: &str) -> Option<u8> {
    title.split_whitespace().skip(1).find_map(roman_value)
}

/// Day number within an event, from the first rule that applies:
/// Chanukah's candle count, Chol HaMoed position, a Roman numeral, the
/// pattern's Hebrew-date window, else day 1. Numbers above `total_days` are
/// ignored.
pub fn day_number(
    title: &str,
    total_days: u8,
    is_israel: bool,
    tag: &TagMatch,
    date: &HDate,
) -> u8 {
    let within = |n: &u8| (1..=total_days).contains(n);

    if title.contains("Chanukah")
        && let Some(day) = chanukah_day(title).filter(within)
    {
        return day;
    }

    if title.contains(CHOL_HAMOED_MARKER) {
        let leading_yom_tov = if is_israel { 1 } else { 2 };
        if let Some(day) = roman_suffix(title)
            .and_then(|n| n.checked_sub(leading_yom_tov))
            .filter(within)
        {
            return day;
        }
    }

    if let Some(day) = roman_suffix(title).filter(within) {
        return day;
    }

    if let Some(day) = tag
        .date_range
        .and_then(|range| range.day_number(date))
        .filter(within)
    {
        return day;
    }

    1
}

/// Maps calendar events to tags through a [`PatternStore`].
#[derive(Clone)]
pub struct TagResolver {
    store: Arc<dyn PatternStore>,
}

impl TagResolver {
    pub fn new(store: Arc<dyn PatternStore>) -> Self {
        Self { store }
    }

    /// Resolves one event. `Ok(None)` means no tag covers it; store failures
    /// are returned as errors.
    ///
    /// Candidates come from the store best-first; the first whose Hebrew-date
    /// window (if any) contains `date` wins.
    pub async fn resolve(
        &self,
        title: &str,
        category: HolidayCategory,
        date: &HDate,
        is_israel: bool,
    ) -> Result<Option<Resolution>, StoreError> {
        debug!(title, %category, "Matching calendar event");

        let candidates = self
            .store
            .match_event(title, category)
            .await
            .inspect_err(|e| warn!(title, %category, error = %e, "Pattern store query failed"))?;

        let Some(tag) = candidates
            .into_iter()
            .find(|m| m.date_range.is_none_or(|range| range.contains(date)))
        else {
            debug!(title, %category, "No tag for calendar event");
            return Ok(None);
        };

        let total_days = tag.metadata.total_days(is_israel).max(1);
        let day_number = day_number(title, total_days, is_israel, &tag, date);
        let position = DayPosition {
            day_number,
            total_days,
            is_final_day: day_number == total_days,
            fast_start_type: tag.metadata.fast_start_type,
        };

        debug!(title, tag = %tag.tag_key, day_number, total_days, "Matched calendar event");
        Ok(Some(Resolution { tag, position }))
    }
}

impl std::fmt::Debug for TagResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagResolver").finish_non_exhaustive()
    }
}
