//! Yearly holiday table.
//!
//! Titles use the English (Sephardi) vocabulary of the hebcal libraries so
//! that stored tag patterns written against that vocabulary keep matching.

use super::CalEvent;
use super::flags::EventFlags as F;
use super::locale::{gematriya, ordinal};
use crate::hdate::{HDate, HMonth, day_on_or_before, is_leap_year, months_in_year};

const SUNDAY: u8 = 0;
const MONDAY: u8 = 1;
const FRIDAY: u8 = 5;
const SATURDAY: u8 = 6;

const ROMAN: [&str; 8] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII"];
const HEBREW_ORDINAL: [&str; 8] = ["א׳", "ב׳", "ג׳", "ד׳", "ה׳", "ו׳", "ז׳", "ח׳"];

struct YearEvents {
    year: i32,
    il: bool,
    events: Vec<CalEvent>,
}

impl YearEvents {
    fn date(&self, month: HMonth, day: u8) -> HDate {
        HDate::new_clamped(self.year, month, day)
    }

    fn push(&mut self, date: HDate, flags: F, desc: String, base: &str, hebrew: String) {
        self.events
            .push(CalEvent::with_base(date, flags, desc, base, hebrew));
    }

    fn on(&mut self, month: HMonth, day: u8, flags: F, desc: &str, hebrew: &str) {
        let date = self.date(month, day);
        self.push(date, flags, desc.to_string(), desc, hebrew.to_string());
    }

    /// Adds a fast that moves to Sunday when its date is a Saturday.
    fn postponable_fast(&mut self, month: HMonth, day: u8, flags: F, desc: &str, hebrew: &str) {
        let date = self.date(month, day);
        if date.weekday() == SATURDAY {
            self.push(
                date.add_days(1),
                flags,
                format!("{desc} (observed)"),
                desc,
                hebrew.to_string(),
            );
        } else {
            self.push(date, flags, desc.to_string(), desc, hebrew.to_string());
        }
    }

    fn special_shabbat(&mut self, rd: i64, desc: &str, hebrew: &str) {
        self.push(
            HDate::from_rd(rd),
            F::SPECIAL_SHABBAT,
            desc.to_string(),
            desc,
            hebrew.to_string(),
        );
    }

    /// Festival days numbered with Roman numerals starting on `first_day`.
    /// `chag_days` leading days are Yom Tov; the rest up to `chm_until` are
    /// Chol HaMoed.
    fn festival(
        &mut self,
        month: HMonth,
        first_day: u8,
        chag_days: usize,
        chm_until: usize,
        name: &str,
        hebrew: &str,
    ) {
        for (i, roman) in ROMAN.iter().enumerate().take(chm_until) {
            let date = self.date(month, first_day + i as u8);
            if i < chag_days {
                let flags = if i + 1 == chag_days {
                    F::CHAG | F::YOM_TOV_ENDS
                } else {
                    F::CHAG | F::LIGHT_CANDLES_TZEIS
                };
                self.push(
                    date,
                    flags,
                    format!("{name} {roman}"),
                    name,
                    format!("{hebrew} {}", HEBREW_ORDINAL[i]),
                );
            } else {
                self.push(
                    date,
                    F::CHOL_HAMOED,
                    format!("{name} {roman} (CH''M)"),
                    name,
                    format!("{hebrew} {} (חוה״מ)", HEBREW_ORDINAL[i]),
                );
            }
        }
    }
}

/// Every event of Hebrew `year`, in date order.
pub(super) fn year_events(year: i32, il: bool, omer: bool) -> Vec<CalEvent> {
    let mut y = YearEvents {
        year,
        il,
        events: Vec::with_capacity(160),
    };

    tishrei(&mut y);
    chanukah(&mut y);
    winter(&mut y);
    adar(&mut y);
    nisan(&mut y);
    if omer {
        omer_days(&mut y);
    }
    modern(&mut y);
    summer(&mut y);
    rosh_chodesh(&mut y);

    y.events.sort_by_key(|e| e.date().rd());
    y.events
}

fn tishrei(y: &mut YearEvents) {
    use HMonth::Tishrei;

    let year = y.year;
    let rh = y.date(Tishrei, 1);
    y.push(
        rh,
        F::CHAG | F::LIGHT_CANDLES_TZEIS,
        format!("Rosh Hashana {year}"),
        "Rosh Hashana",
        format!("ראש השנה {}", gematriya(year.unsigned_abs())),
    );
    y.push(
        y.date(Tishrei, 2),
        F::CHAG | F::YOM_TOV_ENDS,
        "Rosh Hashana II".to_string(),
        "Rosh Hashana",
        "ראש השנה ב׳".to_string(),
    );
    y.postponable_fast(Tishrei, 3, F::MINOR_FAST, "Tzom Gedaliah", "צום גדליה");
    y.special_shabbat(
        day_on_or_before(SATURDAY, rh.rd() + 7),
        "Shabbat Shuva",
        "שבת שובה",
    );
    y.on(
        Tishrei,
        9,
        F::EREV | F::LIGHT_CANDLES,
        "Erev Yom Kippur",
        "ערב יום כפור",
    );
    y.on(
        Tishrei,
        10,
        F::CHAG | F::MAJOR_FAST,
        "Yom Kippur",
        "יום כפור",
    );
    y.on(
        Tishrei,
        14,
        F::EREV | F::LIGHT_CANDLES,
        "Erev Sukkot",
        "ערב סוכות",
    );

    let chag_days = if y.il { 1 } else { 2 };
    y.festival(Tishrei, 15, chag_days, 6, "Sukkot", "סוכות");
    y.push(
        y.date(Tishrei, 21),
        F::CHOL_HAMOED | F::LIGHT_CANDLES,
        "Sukkot VII (Hoshana Raba)".to_string(),
        "Sukkot",
        "סוכות ז׳ (הושענא רבה)".to_string(),
    );
    if y.il {
        y.on(
            Tishrei,
            22,
            F::CHAG | F::YOM_TOV_ENDS,
            "Shmini Atzeret",
            "שמיני עצרת",
        );
    } else {
        y.on(
            Tishrei,
            22,
            F::CHAG | F::LIGHT_CANDLES_TZEIS,
            "Shmini Atzeret",
            "שמיני עצרת",
        );
        y.on(
            Tishrei,
            23,
            F::CHAG | F::YOM_TOV_ENDS,
            "Simchat Torah",
            "שמחת תורה",
        );
    }
}

fn chanukah(y: &mut YearEvents) {
    let start = y.date(HMonth::Kislev, 25).rd();
    for candles in 1..=8u32 {
        let (desc, hebrew) = if candles == 1 {
            (
                "Chanukah: 1 Candle".to_string(),
                "חֲנוּכָּה: א׳ נֵר".to_string(),
            )
        } else {
            (
                format!("Chanukah: {candles} Candles"),
                format!("חֲנוּכָּה: {} נֵרוֹת", gematriya(candles)),
            )
        };
        let flags = if candles == 1 {
            F::CHANUKAH_CANDLES | F::MINOR_HOLIDAY | F::EREV
        } else {
            F::CHANUKAH_CANDLES | F::MINOR_HOLIDAY
        };
        y.push(
            HDate::from_rd(start + i64::from(candles) - 2),
            flags,
            desc,
            "Chanukah",
            hebrew,
        );
    }
    y.push(
        HDate::from_rd(start + 7),
        F::MINOR_HOLIDAY,
        "Chanukah: 8th Day".to_string(),
        "Chanukah",
        "חֲנוּכָּה: יוֹם ח׳".to_string(),
    );
}

fn winter(y: &mut YearEvents) {
    y.on(
        HMonth::Tevet,
        1,
        F::MINOR_HOLIDAY,
        "Chag HaBanot",
        "חג הבנות",
    );
    y.on(
        HMonth::Tevet,
        10,
        F::MINOR_FAST,
        "Asara B'Tevet",
        "עשרה בטבת",
    );
    y.on(
        HMonth::Shvat,
        15,
        F::MINOR_HOLIDAY,
        "Tu BiShvat",
        "ט״ו בשבט",
    );
}

fn adar(y: &mut YearEvents) {
    let purim_month = if is_leap_year(y.year) {
        y.on(
            HMonth::Adar1,
            14,
            F::MINOR_HOLIDAY,
            "Purim Katan",
            "פורים קטן",
        );
        HMonth::Adar2
    } else {
        HMonth::Adar1
    };

    // Advanced to Thursday when the 13th is a Saturday.
    let esther = if y.date(purim_month, 13).weekday() == SATURDAY {
        11
    } else {
        13
    };
    y.on(
        purim_month,
        esther,
        F::MINOR_FAST,
        "Ta'anit Esther",
        "תענית אסתר",
    );
    y.on(
        purim_month,
        13,
        F::EREV | F::MINOR_HOLIDAY,
        "Erev Purim",
        "ערב פורים",
    );
    y.on(purim_month, 14, F::MINOR_HOLIDAY, "Purim", "פורים");
    y.on(
        purim_month,
        15,
        F::MINOR_HOLIDAY,
        "Shushan Purim",
        "שושן פורים",
    );

    let shekalim = day_on_or_before(SATURDAY, y.date(purim_month, 1).rd());
    let zachor = day_on_or_before(SATURDAY, y.date(purim_month, 13).rd());
    let hachodesh = day_on_or_before(SATURDAY, y.date(HMonth::Nisan, 1).rd());
    y.special_shabbat(shekalim, "Shabbat Shekalim", "שבת שקלים");
    y.special_shabbat(zachor, "Shabbat Zachor", "שבת זכור");
    y.special_shabbat(hachodesh - 7, "Shabbat Parah", "שבת פרה");
    y.special_shabbat(hachodesh, "Shabbat HaChodesh", "שבת החדש");
}

fn nisan(y: &mut YearEvents) {
    use HMonth::{Nisan, Sivan};

    let hagadol = day_on_or_before(SATURDAY, y.date(Nisan, 14).rd());
    y.special_shabbat(hagadol, "Shabbat HaGadol", "שבת הגדול");

    let bechorot = if y.date(Nisan, 14).weekday() == SATURDAY {
        12
    } else {
        14
    };
    y.on(
        Nisan,
        bechorot,
        F::MINOR_FAST,
        "Ta'anit Bechorot",
        "תענית בכורות",
    );
    y.on(
        Nisan,
        14,
        F::EREV | F::LIGHT_CANDLES,
        "Erev Pesach",
        "ערב פסח",
    );

    let chag_days = if y.il { 1 } else { 2 };
    y.festival(Nisan, 15, chag_days, 6, "Pesach", "פסח");
    if y.il {
        y.push(
            y.date(Nisan, 21),
            F::CHAG | F::YOM_TOV_ENDS,
            "Pesach VII".to_string(),
            "Pesach",
            "פסח ז׳".to_string(),
        );
    } else {
        y.push(
            y.date(Nisan, 21),
            F::CHAG | F::LIGHT_CANDLES_TZEIS,
            "Pesach VII".to_string(),
            "Pesach",
            "פסח ז׳".to_string(),
        );
        y.push(
            y.date(Nisan, 22),
            F::CHAG | F::YOM_TOV_ENDS,
            "Pesach VIII".to_string(),
            "Pesach",
            "פסח ח׳".to_string(),
        );
    }

    y.on(
        HMonth::Iyyar,
        14,
        F::MINOR_HOLIDAY,
        "Pesach Sheni",
        "פסח שני",
    );
    y.on(
        HMonth::Iyyar,
        18,
        F::MINOR_HOLIDAY,
        "Lag BaOmer",
        "ל״ג בעומר",
    );
    y.on(
        Sivan,
        5,
        F::EREV | F::LIGHT_CANDLES,
        "Erev Shavuot",
        "ערב שבועות",
    );
    if y.il {
        y.on(Sivan, 6, F::CHAG | F::YOM_TOV_ENDS, "Shavuot", "שבועות");
    } else {
        y.push(
            y.date(Sivan, 6),
            F::CHAG | F::LIGHT_CANDLES_TZEIS,
            "Shavuot I".to_string(),
            "Shavuot",
            "שבועות א׳".to_string(),
        );
        y.push(
            y.date(Sivan, 7),
            F::CHAG | F::YOM_TOV_ENDS,
            "Shavuot II".to_string(),
            "Shavuot",
            "שבועות ב׳".to_string(),
        );
    }
}

fn omer_days(y: &mut YearEvents) {
    let start = y.date(HMonth::Nisan, 16).rd();
    for day in 1..=49u32 {
        y.push(
            HDate::from_rd(start + i64::from(day) - 1),
            F::OMER_COUNT,
            format!("{} day of the Omer", ordinal(day)),
            "Omer",
            format!("עומר יום {}", gematriya(day)),
        );
    }
}

fn modern(y: &mut YearEvents) {
    use HMonth::{Iyyar, Nisan};

    let shoah = y.date(Nisan, 27);
    let shoah = match shoah.weekday() {
        FRIDAY => shoah.add_days(-1),
        SUNDAY => shoah.add_days(1),
        _ => shoah,
    };
    y.push(
        shoah,
        F::MODERN_HOLIDAY,
        "Yom HaShoah".to_string(),
        "Yom HaShoah",
        "יום השואה".to_string(),
    );

    let atzmaut = y.date(Iyyar, 5);
    let atzmaut = match atzmaut.weekday() {
        FRIDAY => atzmaut.add_days(-1),
        SATURDAY => atzmaut.add_days(-2),
        MONDAY => atzmaut.add_days(1),
        _ => atzmaut,
    };
    y.push(
        atzmaut.add_days(-1),
        F::MODERN_HOLIDAY,
        "Yom HaZikaron".to_string(),
        "Yom HaZikaron",
        "יום הזכרון".to_string(),
    );
    y.push(
        atzmaut,
        F::MODERN_HOLIDAY,
        "Yom HaAtzma'ut".to_string(),
        "Yom HaAtzma'ut",
        "יום העצמאות".to_string(),
    );
    y.on(
        Iyyar,
        28,
        F::MODERN_HOLIDAY,
        "Yom Yerushalayim",
        "יום ירושלים",
    );
}

fn summer(y: &mut YearEvents) {
    use HMonth::{Av, Elul, Tamuz};

    y.postponable_fast(Tamuz, 17, F::MINOR_FAST, "Tzom Tammuz", "צום תמוז");

    let av9 = y.date(Av, 9);
    let fast = if av9.weekday() == SATURDAY {
        av9.add_days(1)
    } else {
        av9
    };
    y.push(
        fast.add_days(-1),
        F::EREV,
        "Erev Tish'a B'Av".to_string(),
        "Erev Tish'a B'Av",
        "ערב תשעה באב".to_string(),
    );
    y.postponable_fast(Av, 9, F::MAJOR_FAST, "Tish'a B'Av", "תשעה באב");
    y.special_shabbat(
        day_on_or_before(SATURDAY, av9.rd()),
        "Shabbat Chazon",
        "שבת חזון",
    );
    y.special_shabbat(
        day_on_or_before(SATURDAY, y.date(Av, 16).rd()),
        "Shabbat Nachamu",
        "שבת נחמו",
    );
    y.on(Av, 15, F::MINOR_HOLIDAY, "Tu B'Av", "ט״ו באב");

    y.on(
        Elul,
        1,
        F::MINOR_HOLIDAY,
        "Rosh Hashana LaBehemot",
        "ראש השנה למעשר בהמה",
    );
    y.on(
        Elul,
        29,
        F::EREV | F::LIGHT_CANDLES,
        "Erev Rosh Hashana",
        "ערב ראש השנה",
    );
}

/// Rosh Chodesh for every month but Tishrei, plus the Shabbat that
/// announces it.
fn rosh_chodesh(y: &mut YearEvents) {
    let year = y.year;
    let order = (HMonth::Cheshvan.number()..=months_in_year(year))
        .chain(HMonth::Nisan.number()..=HMonth::Elul.number())
        .filter_map(HMonth::from_number);

    for month in order {
        let first = y.date(month, 1);
        let prev = first.add_days(-1);
        let name = month.name(year);
        let hebrew = month.hebrew_name(year);

        let start = if prev.day() == 30 { prev } else { first };
        if prev.day() == 30 {
            y.push(
                prev,
                F::ROSH_CHODESH,
                format!("Rosh Chodesh {name}"),
                "Rosh Chodesh",
                format!("ראש חודש {hebrew}"),
            );
        }
        y.push(
            first,
            F::ROSH_CHODESH,
            format!("Rosh Chodesh {name}"),
            "Rosh Chodesh",
            format!("ראש חודש {hebrew}"),
        );

        y.push(
            HDate::from_rd(day_on_or_before(SATURDAY, start.rd() - 1)),
            F::SHABBAT_MEVARCHIM,
            format!("Shabbat Mevarchim Chodesh {name}"),
            "Shabbat Mevarchim Chodesh",
            format!("שבת מברכים חודש {hebrew}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn titles_on(events: &[CalEvent], date: &str) -> Vec<String> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        events
            .iter()
            .filter(|e| e.gregorian() == date)
            .map(|e| e.desc().to_string())
            .collect()
    }

    #[test]
    fn sukkot_differs_between_israel_and_diaspora() {
        let il = year_events(5786, true, false);
        let chul = year_events(5786, false, false);
        assert_eq!(titles_on(&il, "2025-10-07"), ["Sukkot I"]);
        assert_eq!(titles_on(&il, "2025-10-08"), ["Sukkot II (CH''M)"]);
        assert_eq!(titles_on(&chul, "2025-10-08"), ["Sukkot II"]);
        assert_eq!(titles_on(&chul, "2025-10-09"), ["Sukkot III (CH''M)"]);
        assert_eq!(titles_on(&chul, "2025-10-15"), ["Simchat Torah"]);
        assert!(titles_on(&il, "2025-10-15").is_empty());
    }

    #[test]
    fn yom_kippur_and_rosh_hashana() {
        let events = year_events(5786, false, false);
        assert_eq!(titles_on(&events, "2025-09-23"), ["Rosh Hashana 5786"]);
        assert_eq!(titles_on(&events, "2025-10-01"), ["Erev Yom Kippur"]);
        assert_eq!(titles_on(&events, "2025-10-02"), ["Yom Kippur"]);
    }

    #[test]
    fn chanukah_candles_and_eighth_day() {
        let events = year_events(5786, false, false);
        assert_eq!(titles_on(&events, "2025-12-14"), ["Chanukah: 1 Candle"]);
        assert_eq!(titles_on(&events, "2025-12-15"), ["Chanukah: 2 Candles"]);
        assert_eq!(titles_on(&events, "2025-12-22"), ["Chanukah: 8th Day"]);
    }

    #[test]
    fn postponed_tisha_bav_is_observed() {
        // 9 Av 5782 was a Saturday.
        let events = year_events(5782, false, false);
        assert_eq!(titles_on(&events, "2022-08-07"), ["Tish'a B'Av (observed)"]);
        assert_eq!(
            titles_on(&events, "2022-08-06"),
            ["Erev Tish'a B'Av", "Shabbat Chazon"]
        );

        let events = year_events(5785, false, false);
        assert_eq!(titles_on(&events, "2025-08-03"), ["Tish'a B'Av"]);
    }

    #[test]
    fn quiet_wednesday_has_no_events() {
        let events = year_events(5786, false, true);
        assert!(titles_on(&events, "2025-12-24").is_empty());
    }

    #[test]
    fn omer_is_opt_in() {
        let without = year_events(5786, false, false);
        let with = year_events(5786, false, true);
        assert!(!without.iter().any(|e| e.flags().contains(F::OMER_COUNT)));
        assert_eq!(
            with.iter().filter(|e| e.flags().contains(F::OMER_COUNT)).count(),
            49
        );
        assert_eq!(
            titles_on(&with, "2026-04-03"),
            ["Pesach II", "1st day of the Omer"]
        );
        assert_eq!(titles_on(&without, "2026-04-03"), ["Pesach II"]);
    }

    #[test]
    fn rosh_chodesh_has_one_or_two_days() {
        let events = year_events(5786, false, false);
        let cheshvan = events
            .iter()
            .filter(|e| e.desc() == "Rosh Chodesh Cheshvan")
            .count();
        assert_eq!(cheshvan, 2);
        assert!(!events.iter().any(|e| e.desc() == "Rosh Chodesh Tishrei"));
    }

    #[test]
    fn events_are_date_ordered() {
        let events = year_events(5787, true, true);
        assert!(events.windows(2).all(|w| w[0].date().rd() <= w[1].date().rd()));
        assert!(events.iter().any(|e| e.desc() == "Purim Katan"));
    }
}
