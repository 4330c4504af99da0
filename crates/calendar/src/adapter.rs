//! Normalizes calendar events into [`Holiday`] records.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hdate::HDate;
use crate::hebcal::{CalEvent, CalOptions, EventFlags, EventSource, Locale, lookup_translation};

static CANDLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*Candles?").expect("valid regex"));
static DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)?\s*Day").expect("valid regex"));
static HEBREW_CANDLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"חנוכה:\s*([בגדהוזח])׳?\s*נרות").expect("valid regex"));
static HEBREW_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"חנוכה:\s*יום\s*([אבגדהוזח])׳?").expect("valid regex"));
static NIQQUD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{05B0}-\x{05C7}]").expect("valid regex"));

/// Hebrew letters for 1 through 8.
const HEBREW_NUMERALS: [char; 8] = ['א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח'];

/// Observances with no bearing on prayer times.
const EXCLUDED: [&str; 2] = ["Chag HaBanot", "Rosh Hashana LaBehemot"];

/// English transliteration style for rendered names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransliterationStyle {
    Ashkenazi,
    #[default]
    Sephardi,
}

impl TransliterationStyle {
    pub fn locale(self) -> Locale {
        match self {
            TransliterationStyle::Ashkenazi => Locale::Ashkenazi,
            TransliterationStyle::Sephardi => Locale::En,
        }
    }

    /// Renders a fixed English name ("Shabbat", "Erev Shabbat") in this style,
    /// falling back to the name itself.
    pub fn transliterate(self, name: &str) -> String {
        lookup_translation(name, self.locale())
            .unwrap_or(name)
            .to_string()
    }
}

impl FromStr for TransliterationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ashkenazi" => Ok(Self::Ashkenazi),
            "sephardi" | "" => Ok(Self::Sephardi),
            other => Err(format!("unknown transliteration style: {other}")),
        }
    }
}

impl fmt::Display for TransliterationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransliterationStyle::Ashkenazi => "ashkenazi",
            TransliterationStyle::Sephardi => "sephardi",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayCategory {
    Major,
    Minor,
    Fast,
    RoshChodesh,
    Shabbat,
}

impl HolidayCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            HolidayCategory::Major => "major",
            HolidayCategory::Minor => "minor",
            HolidayCategory::Fast => "fast",
            HolidayCategory::RoshChodesh => "roshchodesh",
            HolidayCategory::Shabbat => "shabbat",
        }
    }
}

impl FromStr for HolidayCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "fast" => Ok(Self::Fast),
            "roshchodesh" => Ok(Self::RoshChodesh),
            "shabbat" => Ok(Self::Shabbat),
            other => Err(format!("unknown holiday category: {other}")),
        }
    }
}

impl fmt::Display for HolidayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar event normalized for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    /// Title in the requested style, after the Chanukah transform.
    pub name: String,
    pub name_hebrew: String,
    /// Untransformed Sephardi title, the key stored patterns are written
    /// against.
    pub original_name: String,
    pub category: HolidayCategory,
    /// Set for every CHAG event, so Yom Kippur is both a fast and Yom Tov.
    pub is_yom_tov: bool,
    pub requires_candles: bool,
}

/// Classification of an event's flags: fast, then Rosh Chodesh, then special
/// Shabbat, then Chag, falling back to minor.
pub fn classify(flags: EventFlags) -> (HolidayCategory, bool, bool) {
    let is_yom_tov = flags.contains(EventFlags::CHAG);
    let requires_candles = flags.intersects(
        EventFlags::CHAG | EventFlags::LIGHT_CANDLES | EventFlags::LIGHT_CANDLES_TZEIS,
    );

    let category = if flags.intersects(EventFlags::MAJOR_FAST | EventFlags::MINOR_FAST) {
        HolidayCategory::Fast
    } else if flags.contains(EventFlags::ROSH_CHODESH) {
        HolidayCategory::RoshChodesh
    } else if flags.contains(EventFlags::SPECIAL_SHABBAT) {
        HolidayCategory::Shabbat
    } else if is_yom_tov {
        HolidayCategory::Major
    } else {
        HolidayCategory::Minor
    };

    (category, is_yom_tov, requires_candles)
}

/// Rewrites the library's Chanukah titles to "Chanukah Day N". "N Candles"
/// is day N-1; "8th Day" is day 8. Other titles are returned unchanged.
pub fn chanukah_day_title(name: &str) -> Cow<'_, str> {
    if !name.contains("Chanukah") {
        return Cow::Borrowed(name);
    }
    match chanukah_day(name) {
        Some(day) => Cow::Owned(format!("Chanukah Day {day}")),
        None => Cow::Borrowed(name),
    }
}

/// Day of Chanukah encoded in an English title, if any.
pub fn chanukah_day(name: &str) -> Option<u8> {
    if let Some(candles) = CANDLES
        .captures(name)
        .and_then(|c| c[1].parse::<u8>().ok())
        && (2..=8).contains(&candles)
    {
        return Some(candles - 1);
    }
    DAY.captures(name)
        .and_then(|c| c[1].parse::<u8>().ok())
        .filter(|day| (1..=8).contains(day))
}

/// Hebrew counterpart of [`chanukah_day_title`], emitting "חנוכה יום X׳".
pub fn chanukah_day_title_hebrew(name: &str) -> Cow<'_, str> {
    let stripped = strip_niqqud(name);
    if !stripped.contains("חנוכה") {
        return Cow::Borrowed(name);
    }

    let candles = HEBREW_CANDLES
        .captures(&stripped)
        .and_then(|c| hebrew_numeral(&c[1]))
        .filter(|n| (2..=8).contains(n))
        .map(|n| n - 1);
    let day = candles.or_else(|| {
        HEBREW_DAY
            .captures(&stripped)
            .and_then(|c| hebrew_numeral(&c[1]))
    });

    match day {
        Some(day) => Cow::Owned(format!(
            "חנוכה יום {}׳",
            HEBREW_NUMERALS[usize::from(day - 1)]
        )),
        None => Cow::Borrowed(name),
    }
}

fn hebrew_numeral(letter: &str) -> Option<u8> {
    let c = letter.chars().next()?;
    HEBREW_NUMERALS
        .iter()
        .position(|&n| n == c)
        .map(|i| i as u8 + 1)
}

/// Removes Hebrew vowel points (U+05B0..=U+05C7).
pub fn strip_niqqud(s: &str) -> Cow<'_, str> {
    NIQQUD.replace_all(s, "")
}

/// Builds a [`Holiday`] from one event.
pub fn holiday_from_event(event: &CalEvent, style: TransliterationStyle) -> Holiday {
    let (category, is_yom_tov, requires_candles) = classify(event.flags());
    let name = event.render(style.locale());
    let name_hebrew = event.render(Locale::He);

    Holiday {
        name: chanukah_day_title(&name).into_owned(),
        name_hebrew: chanukah_day_title_hebrew(&name_hebrew).into_owned(),
        original_name: event.render(Locale::En),
        category,
        is_yom_tov,
        requires_candles,
    }
}

fn is_relevant(holiday: &Holiday) -> bool {
    !EXCLUDED.contains(&holiday.original_name.as_str())
}

/// Which event kinds are requested from the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterOptions {
    pub exclude_modern: bool,
    pub special_shabbat: bool,
    pub shabbat_mevarchim: bool,
    /// Daily Omer count events.
    pub omer: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            exclude_modern: true,
            special_shabbat: true,
            shabbat_mevarchim: true,
            omer: false,
        }
    }
}

/// Turns an [`EventSource`] into per-date [`Holiday`] lists.
#[derive(Clone)]
pub struct CalendarAdapter {
    source: Arc<dyn EventSource>,
    options: AdapterOptions,
}

impl CalendarAdapter {
    pub fn new(source: Arc<dyn EventSource>, options: AdapterOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> AdapterOptions {
        self.options
    }

    pub fn cal_options(&self, year: i32, is_israel: bool) -> CalOptions {
        CalOptions {
            year,
            il: is_israel,
            no_holidays: false,
            no_minor_fast: false,
            no_modern: self.options.exclude_modern,
            no_rosh_chodesh: false,
            no_special_shabbat: !self.options.special_shabbat,
            shabbat_mevarchim: self.options.shabbat_mevarchim,
            omer: self.options.omer,
        }
    }

    /// Holidays falling on `date`, excluding observances with no prayer-time
    /// relevance.
    pub fn holidays_for_date(
        &self,
        date: NaiveDate,
        style: TransliterationStyle,
        is_israel: bool,
    ) -> Vec<Holiday> {
        let year = HDate::from_gregorian(date).year();
        let events = self
            .source
            .hebrew_calendar(&self.cal_options(year, is_israel));

        let holidays: Vec<Holiday> = events
            .iter()
            .filter(|event| event.gregorian() == date)
            .map(|event| holiday_from_event(event, style))
            .filter(is_relevant)
            .collect();

        debug!(%date, count = holidays.len(), "Fetched holidays from calendar");
        holidays
    }

    /// Every relevant holiday of Hebrew `year` with its date, in date order.
    pub fn holidays_for_year(
        &self,
        year: i32,
        style: TransliterationStyle,
        is_israel: bool,
    ) -> Vec<(HDate, Holiday)> {
        self.source
            .hebrew_calendar(&self.cal_options(year, is_israel))
            .iter()
            .map(|event| (event.date(), holiday_from_event(event, style)))
            .filter(|(_, holiday)| is_relevant(holiday))
            .collect()
    }
}

impl fmt::Debug for CalendarAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarAdapter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdate::HMonth;
    use crate::hebcal::Hebcal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn adapter() -> CalendarAdapter {
        CalendarAdapter::new(Arc::new(Hebcal), AdapterOptions::default())
    }

    #[test]
    fn test_chanukah_candles_to_day() {
        for n in 1..=7 {
            let title = format!("Chanukah: {} Candles", n + 1);
            assert_eq!(chanukah_day_title(&title), format!("Chanukah Day {n}"));
        }
        assert_eq!(chanukah_day_title("Chanukah: 8th Day"), "Chanukah Day 8");
    }

    #[test]
    fn test_chanukah_first_candle_unchanged() {
        assert_eq!(
            chanukah_day_title("Chanukah: 1 Candle"),
            "Chanukah: 1 Candle"
        );
        assert_eq!(chanukah_day_title("Purim"), "Purim");
    }

    #[test]
    fn test_chanukah_hebrew() {
        assert_eq!(
            chanukah_day_title_hebrew("חֲנוּכָּה: ב׳ נֵרוֹת"),
            "חנוכה יום א׳"
        );
        assert_eq!(
            chanukah_day_title_hebrew("חֲנוּכָּה: ח׳ נֵרוֹת"),
            "חנוכה יום ז׳"
        );
        assert_eq!(
            chanukah_day_title_hebrew("חֲנוּכָּה: יוֹם ח׳"),
            "חנוכה יום ח׳"
        );
        assert_eq!(chanukah_day_title_hebrew("פורים"), "פורים");
    }

    #[test]
    fn test_strip_niqqud() {
        assert_eq!(strip_niqqud("חֲנוּכָּה"), "חנוכה");
        assert_eq!(strip_niqqud("שבת"), "שבת");
    }

    #[test]
    fn test_classify_precedence() {
        let (category, yom_tov, candles) = classify(EventFlags::CHAG | EventFlags::MAJOR_FAST);
        assert_eq!(category, HolidayCategory::Fast);
        assert!(yom_tov);
        assert!(candles);

        let (category, yom_tov, candles) = classify(EventFlags::EREV | EventFlags::LIGHT_CANDLES);
        assert_eq!(category, HolidayCategory::Minor);
        assert!(!yom_tov);
        assert!(candles);

        assert_eq!(classify(EventFlags::ROSH_CHODESH).0, HolidayCategory::RoshChodesh);
        assert_eq!(classify(EventFlags::SPECIAL_SHABBAT).0, HolidayCategory::Shabbat);
        assert_eq!(classify(EventFlags::CHAG).0, HolidayCategory::Major);
        assert_eq!(classify(EventFlags::MODERN_HOLIDAY).0, HolidayCategory::Minor);
    }

    #[test]
    fn test_holiday_keeps_original_name() {
        let event = CalEvent::with_base(
            HDate::new(5786, HMonth::Kislev, 26).unwrap(),
            EventFlags::CHANUKAH_CANDLES | EventFlags::MINOR_HOLIDAY,
            "Chanukah: 3 Candles",
            "Chanukah",
            "חֲנוּכָּה: ג׳ נֵרוֹת",
        );
        let holiday = holiday_from_event(&event, TransliterationStyle::Ashkenazi);
        assert_eq!(holiday.name, "Chanukah Day 2");
        assert_eq!(holiday.name_hebrew, "חנוכה יום ב׳");
        assert_eq!(holiday.original_name, "Chanukah: 3 Candles");
        assert_eq!(holiday.category, HolidayCategory::Minor);
    }

    #[test]
    fn test_holidays_for_date_styles() {
        let adapter = adapter();
        let sephardi = adapter.holidays_for_date(date("2025-10-09"), TransliterationStyle::Sephardi, false);
        let ashkenazi =
            adapter.holidays_for_date(date("2025-10-09"), TransliterationStyle::Ashkenazi, false);
        assert_eq!(sephardi[0].name, "Sukkot III (CH''M)");
        assert_eq!(ashkenazi[0].name, "Sukkos III (CH''M)");
        assert_eq!(ashkenazi[0].original_name, "Sukkot III (CH''M)");
    }

    #[test]
    fn test_denylist_is_dropped() {
        // 1 Tevet 5786 (Chag HaBanot) is also the seventh day of Chanukah.
        let holidays =
            adapter().holidays_for_date(date("2025-12-21"), TransliterationStyle::Sephardi, false);
        assert!(holidays.iter().all(|h| h.original_name != "Chag HaBanot"));
        assert!(holidays.iter().any(|h| h.original_name == "Chanukah: 8 Candles"));
    }

    #[test]
    fn test_year_listing_honours_options() {
        let omer = CalendarAdapter::new(
            Arc::new(Hebcal),
            AdapterOptions {
                omer: true,
                ..AdapterOptions::default()
            },
        );
        let with_omer = omer.holidays_for_year(5786, TransliterationStyle::Sephardi, false);
        let without = adapter().holidays_for_year(5786, TransliterationStyle::Sephardi, false);
        assert_eq!(with_omer.len(), without.len() + 49);
        assert!(without.iter().all(|(_, h)| !EXCLUDED.contains(&h.original_name.as_str())));
        assert!(without.windows(2).all(|w| w[0].0.rd() <= w[1].0.rd()));
    }

    #[test]
    fn test_yom_kippur_flags() {
        let holidays =
            adapter().holidays_for_date(date("2025-10-02"), TransliterationStyle::Sephardi, false);
        assert_eq!(holidays.len(), 1);
        assert_eq!(holidays[0].category, HolidayCategory::Fast);
        assert!(holidays[0].is_yom_tov);
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!(
            "ashkenazi".parse::<TransliterationStyle>(),
            Ok(TransliterationStyle::Ashkenazi)
        );
        assert_eq!(
            "".parse::<TransliterationStyle>(),
            Ok(TransliterationStyle::Sephardi)
        );
        assert!("yiddish".parse::<TransliterationStyle>().is_err());
        assert_eq!(TransliterationStyle::Ashkenazi.transliterate("Shabbat"), "Shabbos");
        assert_eq!(TransliterationStyle::Sephardi.transliterate("Shabbat"), "Shabbat");
    }
}
