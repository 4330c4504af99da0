//! Per-day event context: which tagged events are active on a date, which
//! begin tonight and which end tonight.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::adapter::{AdapterOptions, CalendarAdapter, Holiday, HolidayCategory, TransliterationStyle};
use crate::catalog::FastStartType;
use crate::dates::{self, HebrewDate};
use crate::error::StoreError;
use crate::hdate::HDate;
use crate::hebcal::Hebcal;
use crate::location::Location;
use crate::resolver::{Resolution, TagResolver};
use crate::store::PatternStore;

pub const SHABBOS: &str = "shabbos";
pub const EREV_SHABBOS: &str = "erev_shabbos";

pub const SABBATH_TO_YOMTOV: &str = "sabbath_to_yomtov";
pub const YOMTOV_DAY2: &str = "yomtov_day2";
pub const YOMTOV_TO_YOMTOV: &str = "yomtov_to_yomtov";

/// A tagged event in effect on some day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveEvent {
    pub event_code: String,
    pub name_hebrew: String,
    pub name_english: String,
    pub day_number: u8,
    pub total_days: u8,
    pub is_final_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_start_type: Option<FastStartType>,
}

impl ActiveEvent {
    fn from_resolution(resolution: Resolution, style: TransliterationStyle) -> Self {
        let Resolution { tag, position } = resolution;
        Self {
            name_english: tag.english_name(style).to_string(),
            event_code: tag.tag_key,
            name_hebrew: tag.display_name_hebrew,
            day_number: position.day_number,
            total_days: position.total_days,
            is_final_day: position.is_final_day,
            fast_start_type: position.fast_start_type,
        }
    }

    fn single_day(code: &str, name_hebrew: &str, name_english: String) -> Self {
        Self {
            event_code: code.to_string(),
            name_hebrew: name_hebrew.to_string(),
            name_english,
            day_number: 1,
            total_days: 1,
            is_final_day: true,
            fast_start_type: None,
        }
    }

    fn shabbos(style: TransliterationStyle) -> Self {
        Self::single_day(SHABBOS, "שבת", style.transliterate("Shabbat"))
    }

    fn erev_shabbos(style: TransliterationStyle) -> Self {
        Self::single_day(EREV_SHABBOS, "ערב שבת", style.transliterate("Erev Shabbat"))
    }
}

/// Everything known about one date at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayContext {
    pub gregorian_date: NaiveDate,
    pub hebrew_date: HebrewDate,
    pub day_of_week: u8,
    pub is_shabbat: bool,
    pub is_yom_tov: bool,
    pub is_fast_day: bool,
    pub is_in_israel: bool,
    /// Events in effect today.
    pub active_events: Vec<ActiveEvent>,
    /// Events beginning tonight.
    pub erev_events: Vec<ActiveEvent>,
    /// Events ending tonight.
    pub motzei_events: Vec<ActiveEvent>,
    /// Advisory labels; they do not drive activation.
    pub special_contexts: Vec<&'static str>,
    pub holidays: Vec<Holiday>,
}

impl DayContext {
    /// Codes of active, erev and motzei events, without duplicates, in that
    /// order.
    pub fn event_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for event in self
            .active_events
            .iter()
            .chain(&self.erev_events)
            .chain(&self.motzei_events)
        {
            if !codes.contains(&event.event_code) {
                codes.push(event.event_code.clone());
            }
        }
        codes
    }
}

/// Event codes that select the prayer times to show for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZmanimContext {
    pub active_event_codes: Vec<String>,
}

/// Calendar facts about a date, without tag matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayInfo {
    pub date: NaiveDate,
    pub hebrew_date: HebrewDate,
    pub day_of_week: u8,
    pub day_name_hebrew: &'static str,
    pub day_name_english: &'static str,
    pub holidays: Vec<Holiday>,
    pub is_shabbat: bool,
    pub is_yom_tov: bool,
}

/// Seven days starting on Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayInfo>,
}

/// One date's holidays with the events they resolved to.
struct ResolvedDay {
    holidays: Vec<Holiday>,
    events: Vec<ActiveEvent>,
}

impl ResolvedDay {
    fn is_yom_tov(&self) -> bool {
        self.holidays.iter().any(|h| h.is_yom_tov)
    }
}

/// Builds day contexts from the calendar and, when configured, a pattern
/// store.
///
/// Without a store every holiday is left unmatched; Sabbath status is still
/// reported.
#[derive(Debug, Clone)]
pub struct CalendarService {
    adapter: CalendarAdapter,
    resolver: Option<TagResolver>,
}

impl CalendarService {
    pub fn new(adapter: CalendarAdapter, store: Option<Arc<dyn PatternStore>>) -> Self {
        Self {
            adapter,
            resolver: store.map(TagResolver::new),
        }
    }

    /// Service over the built-in calendar.
    pub fn with_builtin_calendar(
        options: AdapterOptions,
        store: Option<Arc<dyn PatternStore>>,
    ) -> Self {
        Self::new(CalendarAdapter::new(Arc::new(Hebcal), options), store)
    }

    pub fn adapter(&self) -> &CalendarAdapter {
        &self.adapter
    }

    pub fn has_store(&self) -> bool {
        self.resolver.is_some()
    }

    pub fn holidays(
        &self,
        date: NaiveDate,
        style: TransliterationStyle,
        is_israel: bool,
    ) -> Vec<Holiday> {
        self.adapter.holidays_for_date(date, style, is_israel)
    }

    pub fn hebrew_date(&self, date: NaiveDate) -> HebrewDate {
        dates::hebrew_date(date)
    }

    pub fn day_info(&self, date: NaiveDate, style: TransliterationStyle, is_israel: bool) -> DayInfo {
        let holidays = self.holidays(date, style, is_israel);
        DayInfo {
            date,
            hebrew_date: dates::hebrew_date(date),
            day_of_week: dates::day_of_week(date),
            day_name_hebrew: dates::day_name_hebrew(date),
            day_name_english: dates::day_name_english(date),
            is_shabbat: dates::is_shabbat(date),
            is_yom_tov: holidays.iter().any(|h| h.is_yom_tov),
            holidays,
        }
    }

    /// The week containing `date`, Sunday through Shabbat.
    pub fn week_info(&self, date: NaiveDate, style: TransliterationStyle, is_israel: bool) -> WeekInfo {
        let start_date = dates::week_start(date);
        let days: Vec<DayInfo> = (0..7)
            .filter_map(|i| start_date.checked_add_days(Days::new(i)))
            .map(|d| self.day_info(d, style, is_israel))
            .collect();
        let end_date = days.last().map_or(start_date, |d| d.date);

        WeekInfo {
            start_date,
            end_date,
            days,
        }
    }

    /// Day context for `date` at `location`.
    ///
    /// A pattern store failure fails the whole computation.
    pub async fn event_day_info(
        &self,
        date: NaiveDate,
        location: &Location,
        style: TransliterationStyle,
    ) -> Result<DayContext, StoreError> {
        let tomorrow = next_day(date);
        let today_resolved = self.resolve_day(date, location, style).await?;
        let tomorrow_resolved = self.resolve_day(tomorrow, location, style).await?;

        let context = assemble(date, location, style, today_resolved, tomorrow_resolved);
        info!(
            %date,
            location = %location.name,
            active = context.active_events.len(),
            erev = context.erev_events.len(),
            motzei = context.motzei_events.len(),
            "Built day context"
        );
        Ok(context)
    }

    /// Day context computed without the pattern store: calendar flags and the
    /// Sabbath events only.
    pub fn degraded_day_info(
        &self,
        date: NaiveDate,
        location: &Location,
        style: TransliterationStyle,
    ) -> DayContext {
        let unresolved = |d: NaiveDate| ResolvedDay {
            holidays: self.holidays(d, style, location.is_israel),
            events: Vec::new(),
        };
        assemble(date, location, style, unresolved(date), unresolved(next_day(date)))
    }

    pub async fn zmanim_context(
        &self,
        date: NaiveDate,
        location: &Location,
        style: TransliterationStyle,
    ) -> Result<ZmanimContext, StoreError> {
        let context = self.event_day_info(date, location, style).await?;
        let active_event_codes = context.event_codes();
        debug!(%date, codes = ?active_event_codes, "Zmanim context");
        Ok(ZmanimContext { active_event_codes })
    }

    /// Resolves each of the date's holidays once.
    async fn resolve_day(
        &self,
        date: NaiveDate,
        location: &Location,
        style: TransliterationStyle,
    ) -> Result<ResolvedDay, StoreError> {
        let holidays = self.holidays(date, style, location.is_israel);
        let mut events = Vec::new();

        let Some(resolver) = &self.resolver else {
            debug!(%date, "No pattern store configured, leaving holidays unmatched");
            return Ok(ResolvedDay { holidays, events });
        };

        let hdate = HDate::from_gregorian(date);
        for holiday in &holidays {
            if let Some(resolution) = resolver
                .resolve(&holiday.original_name, holiday.category, &hdate, location.is_israel)
                .await?
            {
                events.push(ActiveEvent::from_resolution(resolution, style));
            }
        }

        Ok(ResolvedDay { holidays, events })
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn assemble(
    date: NaiveDate,
    location: &Location,
    style: TransliterationStyle,
    today: ResolvedDay,
    tomorrow: ResolvedDay,
) -> DayContext {
    let is_shabbat = dates::is_shabbat(date);
    let is_erev_shabbat = dates::is_shabbat(next_day(date));
    let is_yom_tov = today.is_yom_tov();
    let tomorrow_is_yom_tov = tomorrow.is_yom_tov();

    let mut active_events = Vec::new();
    if is_shabbat {
        active_events.push(ActiveEvent::shabbos(style));
    }
    active_events.extend(today.events.iter().cloned());

    let mut erev_events = Vec::new();
    if is_erev_shabbat {
        erev_events.push(ActiveEvent::erev_shabbos(style));
    }
    erev_events.extend(tomorrow.events.into_iter().filter(|e| e.day_number == 1));

    let mut motzei_events = Vec::new();
    if is_shabbat && !tomorrow_is_yom_tov {
        motzei_events.push(ActiveEvent::shabbos(style));
    }
    motzei_events.extend(today.events.into_iter().filter(|e| e.is_final_day));

    let mut special_contexts = Vec::new();
    if is_shabbat && tomorrow_is_yom_tov {
        special_contexts.push(SABBATH_TO_YOMTOV);
    }
    if !location.is_israel
        && active_events
            .iter()
            .any(|e| e.day_number == 2 && e.total_days == 2)
    {
        special_contexts.push(YOMTOV_DAY2);
    }
    if is_yom_tov && tomorrow_is_yom_tov {
        special_contexts.push(YOMTOV_TO_YOMTOV);
    }

    DayContext {
        gregorian_date: date,
        hebrew_date: dates::hebrew_date(date),
        day_of_week: dates::day_of_week(date),
        is_shabbat,
        is_yom_tov,
        is_fast_day: today
            .holidays
            .iter()
            .any(|h| h.category == HolidayCategory::Fast),
        is_in_israel: location.is_israel,
        active_events,
        erev_events,
        motzei_events,
        special_contexts,
        holidays: today.holidays,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPatternStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_york() -> Location {
        Location::new("New York", 40.7128, -74.0060, chrono_tz::America::New_York)
    }

    fn service() -> CalendarService {
        let store: Arc<dyn PatternStore> = Arc::new(MemoryPatternStore::builtin().unwrap());
        CalendarService::with_builtin_calendar(AdapterOptions::default(), Some(store))
    }

    fn codes(events: &[ActiveEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event_code.as_str()).collect()
    }

    #[tokio::test]
    async fn friday_is_erev_shabbos() {
        let ctx = service()
            .event_day_info(date("2025-12-26"), &new_york(), TransliterationStyle::Ashkenazi)
            .await
            .unwrap();
        assert!(!ctx.is_shabbat);
        assert_eq!(codes(&ctx.erev_events), [EREV_SHABBOS]);
        assert_eq!(ctx.erev_events[0].name_english, "Erev Shabbos");
    }

    #[tokio::test]
    async fn plain_shabbat_ends_tonight() {
        let ctx = service()
            .event_day_info(date("2025-12-27"), &new_york(), TransliterationStyle::Sephardi)
            .await
            .unwrap();
        assert!(ctx.is_shabbat);
        assert_eq!(ctx.active_events[0].event_code, SHABBOS);
        assert_eq!(ctx.active_events[0].name_english, "Shabbat");
        assert_eq!(codes(&ctx.motzei_events), [SHABBOS]);
        assert!(ctx.special_contexts.is_empty());
    }

    #[tokio::test]
    async fn shabbat_flowing_into_yom_tov() {
        let ctx = service()
            .event_day_info(date("2025-04-12"), &new_york(), TransliterationStyle::Sephardi)
            .await
            .unwrap();
        assert!(ctx.is_shabbat);
        assert_eq!(ctx.special_contexts, [SABBATH_TO_YOMTOV]);
        assert!(!codes(&ctx.motzei_events).contains(&SHABBOS));
        assert_eq!(codes(&ctx.erev_events), ["pesach"]);
    }

    #[tokio::test]
    async fn consecutive_yom_tov_days() {
        let ctx = service()
            .event_day_info(date("2025-10-07"), &new_york(), TransliterationStyle::Sephardi)
            .await
            .unwrap();
        assert!(ctx.is_yom_tov);
        assert!(ctx.special_contexts.contains(&YOMTOV_TO_YOMTOV));
        assert!(ctx.motzei_events.is_empty());

        let ctx = service()
            .event_day_info(date("2025-10-08"), &new_york(), TransliterationStyle::Sephardi)
            .await
            .unwrap();
        assert_eq!(ctx.special_contexts, [YOMTOV_DAY2]);
        assert_eq!(codes(&ctx.motzei_events), ["sukkos"]);
    }

    #[tokio::test]
    async fn event_codes_are_deduplicated() {
        let ctx = service()
            .zmanim_context(date("2025-10-08"), &new_york(), TransliterationStyle::Sephardi)
            .await
            .unwrap();
        assert_eq!(ctx.active_event_codes, ["sukkos", "chol_hamoed_sukkos"]);
    }

    #[test]
    fn degraded_context_reports_shabbat() {
        assert!(service().has_store());
        assert!(!CalendarService::with_builtin_calendar(AdapterOptions::default(), None).has_store());

        let ctx = service().degraded_day_info(
            date("2025-10-11"),
            &new_york(),
            TransliterationStyle::Sephardi,
        );
        assert!(ctx.is_shabbat);
        assert_eq!(codes(&ctx.active_events), [SHABBOS]);
        assert!(!ctx.holidays.is_empty());
    }

    #[test]
    fn week_info_starts_on_sunday() {
        let week = service().week_info(date("2025-12-24"), TransliterationStyle::Sephardi, false);
        assert_eq!(week.start_date, date("2025-12-21"));
        assert_eq!(week.end_date, date("2025-12-27"));
        assert_eq!(week.days.len(), 7);
        assert!(week.days[6].is_shabbat);
        assert_eq!(week.days[6].day_name_hebrew, "שבת קודש");
        assert!(week.days[0].holidays.iter().any(|h| h.name == "Chanukah Day 7"));
        assert!(week.days[1].holidays.iter().any(|h| h.name == "Chanukah Day 8"));
    }
}
