use serde::{Deserialize, Serialize};

/// Rendering locale for event titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Sephardi transliteration, the library's native spelling.
    #[default]
    En,
    Ashkenazi,
    He,
}

/// Ashkenazi spellings for titles and title stems.
const ASHKENAZI: &[(&str, &str)] = &[
    ("Shabbat", "Shabbos"),
    ("Erev Shabbat", "Erev Shabbos"),
    ("Sukkot", "Sukkos"),
    ("Erev Sukkot", "Erev Sukkos"),
    ("Shavuot", "Shavuos"),
    ("Erev Shavuot", "Erev Shavuos"),
    ("Shmini Atzeret", "Shmini Atzeres"),
    ("Simchat Torah", "Simchas Torah"),
    ("Asara B'Tevet", "Asara B'Teves"),
    ("Ta'anit Esther", "Ta'anis Esther"),
    ("Ta'anit Bechorot", "Ta'anis Bechoros"),
    ("Tzom Gedaliah", "Tzom Gedalyah"),
    ("Tzom Tammuz", "Shiva Asar B'Tamuz"),
    ("Shabbat Shuva", "Shabbos Shuvah"),
    ("Shabbat Shekalim", "Shabbos Shekalim"),
    ("Shabbat Zachor", "Shabbos Zachor"),
    ("Shabbat Parah", "Shabbos Parah"),
    ("Shabbat HaChodesh", "Shabbos HaChodesh"),
    ("Shabbat HaGadol", "Shabbos HaGadol"),
    ("Shabbat Chazon", "Shabbos Chazon"),
    ("Shabbat Nachamu", "Shabbos Nachamu"),
    ("Shabbat Mevarchim Chodesh", "Shabbos Mevarchim Chodesh"),
    ("Rosh Chodesh Tevet", "Rosh Chodesh Teves"),
    ("Rosh Chodesh Sh'vat", "Rosh Chodesh Shvat"),
    ("Yom Kippur", "Yom Kippur"),
];

/// Looks up the locale's spelling of a whole title or title stem.
pub fn lookup_translation(text: &str, locale: Locale) -> Option<&'static str> {
    match locale {
        Locale::Ashkenazi => ASHKENAZI
            .iter()
            .find(|(en, _)| *en == text)
            .map(|(_, ashk)| *ashk),
        Locale::En | Locale::He => None,
    }
}

/// Renders an English title in `locale`: the full title is tried first,
/// then its stem `base` with the remaining detail appended unchanged.
/// Titles with no translation come back as-is.
pub fn translate(desc: &str, base: &str, locale: Locale) -> String {
    if let Some(full) = lookup_translation(desc, locale) {
        return full.to_string();
    }
    if !base.is_empty()
        && let Some(rest) = desc.strip_prefix(base)
        && let Some(stem) = lookup_translation(base, locale)
    {
        return format!("{stem}{rest}");
    }
    desc.to_string()
}

const ONES: [&str; 10] = ["", "א", "ב", "ג", "ד", "ה", "ו", "ז", "ח", "ט"];
const TENS: [&str; 10] = ["", "י", "כ", "ל", "מ", "נ", "ס", "ע", "פ", "צ"];
const HUNDREDS: [&str; 5] = ["", "ק", "ר", "ש", "ת"];

/// Hebrew numeral for `num`, thousands dropped (5786 renders as תשפ״ו).
pub fn gematriya(num: u32) -> String {
    let mut n = num % 1000;
    let mut letters = String::new();
    while n >= 400 {
        letters.push_str(HUNDREDS[4]);
        n -= 400;
    }
    if n >= 100 {
        letters.push_str(HUNDREDS[(n / 100) as usize]);
        n %= 100;
    }
    match n {
        15 => letters.push_str("טו"),
        16 => letters.push_str("טז"),
        _ => {
            letters.push_str(TENS[(n / 10) as usize]);
            letters.push_str(ONES[(n % 10) as usize]);
        }
    }

    let mut chars: Vec<char> = letters.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => format!("{letters}׳"),
        len => {
            chars.insert(len - 1, '״');
            chars.into_iter().collect()
        }
    }
}

/// English ordinal suffix: 1st, 2nd, 3rd, 4th, 11th, 21st.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
