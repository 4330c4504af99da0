//! Display records and conversions for Hebrew dates.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{CalendarError, Result};
use crate::hdate::{HDate, HMonth};
use crate::hebcal::gematriya;

const DAY_NAMES_HEBREW: [&str; 7] = [
    "יום ראשון",
    "יום שני",
    "יום שלישי",
    "יום רביעי",
    "יום חמישי",
    "יום שישי",
    "שבת קודש",
];

const DAY_NAMES_ENGLISH: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Shabbat",
];

/// A Hebrew date ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HebrewDate {
    pub day: u8,
    pub month: String,
    pub month_num: u8,
    pub year: i32,
    /// e.g. `ד׳ טבת תשפ״ו`
    pub hebrew: String,
    /// e.g. `4 Tevet 5786`
    pub formatted: String,
}

impl From<HDate> for HebrewDate {
    fn from(hd: HDate) -> Self {
        let hebrew = format!(
            "{} {} {}",
            gematriya(u32::from(hd.day())),
            hd.month().hebrew_name(hd.year()),
            gematriya(hd.year().unsigned_abs())
        );
        Self {
            day: hd.day(),
            month: hd.month_name().to_string(),
            month_num: hd.month().number(),
            year: hd.year(),
            hebrew,
            formatted: hd.to_string(),
        }
    }
}

pub fn hebrew_date(date: NaiveDate) -> HebrewDate {
    HDate::from_gregorian(date).into()
}

/// Day of week with Sunday as 0.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn is_shabbat(date: NaiveDate) -> bool {
    day_of_week(date) == 6
}

pub fn day_name_hebrew(date: NaiveDate) -> &'static str {
    DAY_NAMES_HEBREW[usize::from(day_of_week(date))]
}

pub fn day_name_english(date: NaiveDate) -> &'static str {
    DAY_NAMES_ENGLISH[usize::from(day_of_week(date))]
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(day_of_week(date))))
        .unwrap_or(date)
}

/// Gregorian date of a Hebrew date given as numbers (month: Nisan = 1).
pub fn hebrew_to_gregorian(year: i32, month: u8, day: u8) -> Result<NaiveDate> {
    let month = HMonth::from_number(month).ok_or(CalendarError::InvalidHebrewDate { year, month, day })?;
    Ok(HDate::new(year, month, day)?.to_gregorian())
}

/// First and last Gregorian dates of a Hebrew year (1 Tishrei to 29 Elul).
pub fn hebrew_year_range(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = HDate::new(year, HMonth::Tishrei, 1)?;
    let next = HDate::new(year + 1, HMonth::Tishrei, 1)?;
    Ok((start.to_gregorian(), next.add_days(-1).to_gregorian()))
}
