//! Built-in Hebrew calendar event source.
//!
//! [`EventSource`] is the seam the rest of the crate consumes; [`Hebcal`] is
//! the in-process implementation that generates a whole Hebrew year of
//! holidays, fasts, Rosh Chodesh and special Sabbaths.

mod flags;
mod holidays;
mod locale;

use chrono::NaiveDate;

pub use flags::EventFlags;
pub use locale::{Locale, gematriya, lookup_translation, ordinal, translate};

use crate::hdate::HDate;

/// One calendar event as produced by an [`EventSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalEvent {
    date: HDate,
    flags: EventFlags,
    desc: String,
    base: String,
    hebrew: String,
}

impl CalEvent {
    pub fn new(
        date: HDate,
        flags: EventFlags,
        desc: impl Into<String>,
        hebrew: impl Into<String>,
    ) -> Self {
        let desc = desc.into();
        Self {
            date,
            flags,
            base: desc.clone(),
            desc,
            hebrew: hebrew.into(),
        }
    }

    /// Like [`CalEvent::new`], with `base` naming the translatable stem of
    /// `desc` (e.g. "Sukkot" for "Sukkot III (CH''M)").
    pub fn with_base(
        date: HDate,
        flags: EventFlags,
        desc: impl Into<String>,
        base: impl Into<String>,
        hebrew: impl Into<String>,
    ) -> Self {
        Self {
            date,
            flags,
            desc: desc.into(),
            base: base.into(),
            hebrew: hebrew.into(),
        }
    }

    pub fn date(&self) -> HDate {
        self.date
    }

    pub fn gregorian(&self) -> NaiveDate {
        self.date.to_gregorian()
    }

    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Untranslated English title.
    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::He => self.hebrew.clone(),
            Locale::En | Locale::Ashkenazi => translate(&self.desc, &self.base, locale),
        }
    }
}

/// Options for a yearly calendar request. `year` is always a Hebrew year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalOptions {
    pub year: i32,
    pub il: bool,
    pub no_holidays: bool,
    pub no_minor_fast: bool,
    pub no_modern: bool,
    pub no_rosh_chodesh: bool,
    pub no_special_shabbat: bool,
    pub shabbat_mevarchim: bool,
    pub omer: bool,
}

impl CalOptions {
    fn keeps(&self, flags: EventFlags) -> bool {
        let holiday = EventFlags::CHAG
            | EventFlags::LIGHT_CANDLES
            | EventFlags::LIGHT_CANDLES_TZEIS
            | EventFlags::EREV
            | EventFlags::CHOL_HAMOED
            | EventFlags::CHANUKAH_CANDLES
            | EventFlags::MINOR_HOLIDAY
            | EventFlags::MAJOR_FAST
            | EventFlags::MINOR_FAST;

        !(self.no_holidays && flags.intersects(holiday)
            || self.no_minor_fast && flags.contains(EventFlags::MINOR_FAST)
            || self.no_modern && flags.contains(EventFlags::MODERN_HOLIDAY)
            || self.no_rosh_chodesh && flags.contains(EventFlags::ROSH_CHODESH)
            || self.no_special_shabbat && flags.contains(EventFlags::SPECIAL_SHABBAT)
            || !self.shabbat_mevarchim && flags.contains(EventFlags::SHABBAT_MEVARCHIM))
    }
}

/// Source of Hebrew calendar events.
pub trait EventSource: Send + Sync {
    /// Every event of `options.year`, in date order.
    fn hebrew_calendar(&self, options: &CalOptions) -> Vec<CalEvent>;
}

/// In-process calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hebcal;

impl EventSource for Hebcal {
    fn hebrew_calendar(&self, options: &CalOptions) -> Vec<CalEvent> {
        holidays::year_events(options.year, options.il, options.omer)
            .into_iter()
            .filter(|event| options.keeps(event.flags()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdate::HMonth;

    #[test]
    fn options_filter_event_kinds() {
        let all = Hebcal.hebrew_calendar(&CalOptions {
            year: 5786,
            shabbat_mevarchim: true,
            ..Default::default()
        });
        let filtered = Hebcal.hebrew_calendar(&CalOptions {
            year: 5786,
            no_modern: true,
            no_minor_fast: true,
            ..Default::default()
        });

        assert!(all.iter().any(|e| e.desc() == "Yom HaShoah"));
        assert!(all.iter().any(|e| e.flags().contains(EventFlags::SHABBAT_MEVARCHIM)));
        assert!(!filtered.iter().any(|e| e.desc() == "Yom HaShoah"));
        assert!(!filtered.iter().any(|e| e.desc() == "Asara B'Tevet"));
        assert!(!filtered.iter().any(|e| e.flags().contains(EventFlags::SHABBAT_MEVARCHIM)));
        assert!(filtered.iter().any(|e| e.desc() == "Yom Kippur"));
    }

    #[test]
    fn no_holidays_keeps_rosh_chodesh() {
        let events = Hebcal.hebrew_calendar(&CalOptions {
            year: 5786,
            no_holidays: true,
            ..Default::default()
        });
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.flags().contains(EventFlags::ROSH_CHODESH)
            || e.flags().contains(EventFlags::SPECIAL_SHABBAT)
            || e.flags().contains(EventFlags::MODERN_HOLIDAY)));
    }

    #[test]
    fn renders_each_locale() {
        let date = HDate::new(5786, HMonth::Tishrei, 16).unwrap();
        let event = CalEvent::with_base(
            date,
            EventFlags::CHOL_HAMOED,
            "Sukkot II (CH''M)",
            "Sukkot",
            "סוכות ב׳ (חוה״מ)",
        );
        assert_eq!(event.render(Locale::En), "Sukkot II (CH''M)");
        assert_eq!(event.render(Locale::Ashkenazi), "Sukkos II (CH''M)");
        assert_eq!(event.render(Locale::He), "סוכות ב׳ (חוה״מ)");
    }
}
