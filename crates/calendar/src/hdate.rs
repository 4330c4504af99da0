//! Hebrew calendar date arithmetic.
//!
//! Dates are converted through rata die (R.D. 1 = 0001-01-01 proleptic
//! Gregorian), the same fixed-day count `chrono` exposes through
//! `num_days_from_ce`.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

/// R.D. of the day before 1 Tishrei AM 1.
const EPOCH: i64 = -1_373_428;

/// Average Hebrew year length, only used to seed the year search.
const MEAN_YEAR_DAYS: f64 = 365.246_822_205_977_94;

/// Hebrew month numbered the way the calendar library numbers it
/// (Nisan = 1 … Adar II = 13). In a common year month 12 is plain Adar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HMonth {
    Nisan = 1,
    Iyyar = 2,
    Sivan = 3,
    Tamuz = 4,
    Av = 5,
    Elul = 6,
    Tishrei = 7,
    Cheshvan = 8,
    Kislev = 9,
    Tevet = 10,
    Shvat = 11,
    Adar1 = 12,
    Adar2 = 13,
}

const MONTHS: [HMonth; 13] = [
    HMonth::Nisan,
    HMonth::Iyyar,
    HMonth::Sivan,
    HMonth::Tamuz,
    HMonth::Av,
    HMonth::Elul,
    HMonth::Tishrei,
    HMonth::Cheshvan,
    HMonth::Kislev,
    HMonth::Tevet,
    HMonth::Shvat,
    HMonth::Adar1,
    HMonth::Adar2,
];

impl HMonth {
    pub fn from_number(n: u8) -> Option<Self> {
        MONTHS.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Transliterated name as the calendar library spells it.
    pub fn name(self, year: i32) -> &'static str {
        match self {
            HMonth::Nisan => "Nisan",
            HMonth::Iyyar => "Iyyar",
            HMonth::Sivan => "Sivan",
            HMonth::Tamuz => "Tamuz",
            HMonth::Av => "Av",
            HMonth::Elul => "Elul",
            HMonth::Tishrei => "Tishrei",
            HMonth::Cheshvan => "Cheshvan",
            HMonth::Kislev => "Kislev",
            HMonth::Tevet => "Tevet",
            HMonth::Shvat => "Sh'vat",
            HMonth::Adar1 if is_leap_year(year) => "Adar I",
            HMonth::Adar1 => "Adar",
            HMonth::Adar2 => "Adar II",
        }
    }

    pub fn hebrew_name(self, year: i32) -> &'static str {
        match self {
            HMonth::Nisan => "ניסן",
            HMonth::Iyyar => "אייר",
            HMonth::Sivan => "סיון",
            HMonth::Tamuz => "תמוז",
            HMonth::Av => "אב",
            HMonth::Elul => "אלול",
            HMonth::Tishrei => "תשרי",
            HMonth::Cheshvan => "חשון",
            HMonth::Kislev => "כסלו",
            HMonth::Tevet => "טבת",
            HMonth::Shvat => "שבט",
            HMonth::Adar1 if is_leap_year(year) => "אדר א׳",
            HMonth::Adar1 => "אדר",
            HMonth::Adar2 => "אדר ב׳",
        }
    }

    /// Number of days in this month of `year`.
    pub fn days_in(self, year: i32) -> u8 {
        month_length(self.number(), year)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (7 * i64::from(year) + 1).rem_euclid(19) < 7
}

pub fn months_in_year(year: i32) -> u8 {
    if is_leap_year(year) { 13 } else { 12 }
}

/// Days from the epoch to 1 Tishrei of `year`, with the four postponements
/// (molad zaken, GaTaRaD, BeTUTeKaPoT, lo ADU) applied.
fn elapsed_days(year: i32) -> i64 {
    let prev = i64::from(year) - 1;
    let cycle_year = prev % 19;
    let months = 235 * (prev / 19) + 12 * cycle_year + (7 * cycle_year + 1) / 19;
    let parts_elapsed = 204 + 793 * (months % 1080);
    let hours_elapsed = 5 + 12 * months + 793 * (months / 1080) + parts_elapsed / 1080;
    let parts = parts_elapsed % 1080 + 1080 * (hours_elapsed % 24);
    let day = 1 + 29 * months + hours_elapsed / 24;

    let postponed = parts >= 19_440
        || (day % 7 == 2 && parts >= 9_924 && !is_leap_year(year))
        || (day % 7 == 1 && parts >= 16_789 && is_leap_year(year - 1));
    let alt_day = if postponed { day + 1 } else { day };

    if matches!(alt_day % 7, 0 | 3 | 5) {
        alt_day + 1
    } else {
        alt_day
    }
}

pub fn days_in_year(year: i32) -> i64 {
    elapsed_days(year + 1) - elapsed_days(year)
}

fn month_length(month: u8, year: i32) -> u8 {
    let year_days = days_in_year(year);
    let short = match month {
        2 | 4 | 6 | 10 | 13 => true,
        12 => !is_leap_year(year),
        8 => year_days % 10 != 5,
        9 => year_days % 10 == 3,
        _ => false,
    };
    if short { 29 } else { 30 }
}

fn new_year_rd(year: i32) -> i64 {
    EPOCH + elapsed_days(year)
}

fn to_rd(year: i32, month: u8, day: u8) -> i64 {
    let mut days = i64::from(day);
    let tishrei = HMonth::Tishrei.number();
    if month < tishrei {
        for m in tishrei..=months_in_year(year) {
            days += i64::from(month_length(m, year));
        }
        for m in 1..month {
            days += i64::from(month_length(m, year));
        }
    } else {
        for m in tishrei..month {
            days += i64::from(month_length(m, year));
        }
    }
    new_year_rd(year) + days - 1
}

/// A date in the Hebrew calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HDate {
    year: i32,
    month: HMonth,
    day: u8,
}

impl HDate {
    /// Builds a date, rejecting months and days the year does not have.
    pub fn new(year: i32, month: HMonth, day: u8) -> Result<Self> {
        if year < 1 || month.number() > months_in_year(year) || day == 0 || day > month.days_in(year)
        {
            return Err(CalendarError::InvalidHebrewDate {
                year,
                month: month.number(),
                day,
            });
        }
        Ok(Self { year, month, day })
    }

    /// Builds a date assumed valid by construction (yearly tables).
    /// Out-of-range days are clamped to the month's length.
    pub(crate) fn new_clamped(year: i32, month: HMonth, day: u8) -> Self {
        let day = day.clamp(1, month.days_in(year));
        Self { year, month, day }
    }

    pub fn from_rd(rd: i64) -> Self {
        let mut year = ((rd - EPOCH) as f64 / MEAN_YEAR_DAYS).floor() as i32;
        while new_year_rd(year) > rd {
            year -= 1;
        }
        while new_year_rd(year + 1) <= rd {
            year += 1;
        }

        let mut month = if rd < to_rd(year, HMonth::Nisan.number(), 1) {
            HMonth::Tishrei.number()
        } else {
            HMonth::Nisan.number()
        };
        while rd > to_rd(year, month, month_length(month, year)) {
            month += 1;
        }

        let day = (rd - to_rd(year, month, 1) + 1) as u8;
        let month = HMonth::from_number(month).unwrap_or(HMonth::Tishrei);
        Self { year, month, day }
    }

    pub fn from_gregorian(date: NaiveDate) -> Self {
        Self::from_rd(i64::from(date.num_days_from_ce()))
    }

    pub fn rd(&self) -> i64 {
        to_rd(self.year, self.month.number(), self.day)
    }

    pub fn to_gregorian(&self) -> NaiveDate {
        i32::try_from(self.rd())
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> HMonth {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self::from_rd(self.rd() + days)
    }

    /// 0 = Sunday … 6 = Saturday.
    pub fn weekday(&self) -> u8 {
        self.rd().rem_euclid(7) as u8
    }

    pub fn month_name(&self) -> &'static str {
        self.month.name(self.year)
    }
}

impl fmt::Display for HDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month_name(), self.year)
    }
}

/// R.D. of the `weekday` (0 = Sunday) falling on or before `rd`.
pub(crate) fn day_on_or_before(weekday: u8, rd: i64) -> i64 {
    rd - (rd - i64::from(weekday)).rem_euclid(7)
}
