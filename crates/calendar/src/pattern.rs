//! Evaluation of stored tag patterns against calendar event titles.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::adapter::HolidayCategory;

/// How a pattern's value is compared with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Whole-title equality.
    Exact,
    /// SQL `LIKE` with `%` as the only wildcard.
    Wildcard,
    /// Regular expression covering a group of related titles.
    #[serde(alias = "group")]
    Regex,
    /// Matches every event of a [`HolidayCategory`].
    Category,
}

impl MatchType {
    /// Tie-break rank between equal priorities: exact > group > category.
    pub fn specificity(self) -> u8 {
        match self {
            MatchType::Exact => 2,
            MatchType::Wildcard | MatchType::Regex => 1,
            MatchType::Category => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Wildcard => "wildcard",
            MatchType::Regex => "regex",
            MatchType::Category => "category",
        }
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "wildcard" => Ok(Self::Wildcard),
            "regex" | "group" => Ok(Self::Regex),
            "category" => Ok(Self::Category),
            other => Err(format!("unknown match type: {other}")),
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL `LIKE`-style match with `%` as the only wildcard, case-sensitive and
/// without escapes.
///
/// One `%` gives a prefix, suffix, or "both literals in order" match; `%X%`
/// is substring containment. Any other wildcard layout only requires every
/// literal segment to appear somewhere in the title, in any order.
pub fn matches(title: &str, pattern: &str) -> bool {
    if title == pattern {
        return true;
    }
    if !pattern.contains('%') {
        return false;
    }

    let parts: Vec<&str> = pattern.split('%').collect();
    match parts.as_slice() {
        ["", suffix] => return title.ends_with(suffix),
        [prefix, ""] => return title.starts_with(prefix),
        [head, tail] => {
            return title
                .find(head)
                .is_some_and(|idx| title[idx + head.len()..].contains(tail));
        }
        ["", needle, ""] => return title.contains(needle),
        _ => {}
    }

    parts
        .iter()
        .filter(|part| !part.is_empty())
        .all(|part| title.contains(part))
}

fn escape_like(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '\\' | '_' | '%') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Translates a wildcard pattern into SQL `LIKE` patterns (default `\`
/// escape) that a title must all satisfy to agree with [`matches`].
///
/// `_` and `\` are escaped, and layouts that [`matches`] treats as unanchored
/// are wrapped in `%`. Never returns an empty list.
pub fn to_like_patterns(pattern: &str) -> Vec<String> {
    let parts: Vec<&str> = pattern.split('%').collect();
    match parts.as_slice() {
        [literal] => vec![escape_like(literal)],
        ["", suffix] => vec![format!("%{}", escape_like(suffix))],
        [prefix, ""] => vec![format!("{}%", escape_like(prefix))],
        [head, tail] => vec![format!("%{}%{}%", escape_like(head), escape_like(tail))],
        ["", needle, ""] => vec![format!("%{}%", escape_like(needle))],
        _ => {
            let likes: Vec<String> = parts
                .iter()
                .filter(|part| !part.is_empty())
                .map(|part| format!("%{}%", escape_like(part)))
                .collect();
            if likes.is_empty() {
                vec!["%".to_string()]
            } else {
                likes
            }
        }
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(String),
    Wildcard(String),
    Regex(Regex),
    Category(HolidayCategory),
}

impl Matcher {
    pub fn compile(match_type: MatchType, value: &str) -> Result<Self, String> {
        match match_type {
            MatchType::Exact => Ok(Matcher::Exact(value.to_string())),
            MatchType::Wildcard => Ok(Matcher::Wildcard(value.to_string())),
            MatchType::Regex => Regex::new(value)
                .map(Matcher::Regex)
                .map_err(|e| e.to_string()),
            MatchType::Category => value.parse().map(Matcher::Category),
        }
    }

    pub fn is_match(&self, title: &str, category: HolidayCategory) -> bool {
        match self {
            Matcher::Exact(value) => title == value,
            Matcher::Wildcard(pattern) => matches(title, pattern),
            Matcher::Regex(re) => re.is_match(title),
            Matcher::Category(c) => *c == category,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            Matcher::Exact(_) => MatchType::Exact,
            Matcher::Wildcard(_) => MatchType::Wildcard,
            Matcher::Regex(_) => MatchType::Regex,
            Matcher::Category(_) => MatchType::Category,
        }
    }
}

/// Orders candidates best-first: priority descending, then specificity.
/// The sort is stable, so exact ties keep registration order.
pub fn rank_by<T>(candidates: &mut [T], key: impl Fn(&T) -> (i32, MatchType)) {
    candidates.sort_by(|a, b| {
        let (pa, ta) = key(a);
        let (pb, tb) = key(b);
        pb.cmp(&pa)
            .then_with(|| tb.specificity().cmp(&ta.specificity()))
    });
}

/// A flat tag-to-pattern mapping, as used for bulk title lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEventMapping {
    pub tag_key: String,
    pub pattern: String,
    pub priority: i32,
}

/// Tag keys whose wildcard pattern matches any of `names`, each key once,
/// in first-seen order.
pub fn match_event_to_tags(names: &[&str], mappings: &[TagEventMapping]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for name in names {
        for mapping in mappings {
            if matches(name, &mapping.pattern) && !tags.contains(&mapping.tag_key) {
                tags.push(mapping.tag_key.clone());
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_without_wildcard() {
        assert!(matches("Purim", "Purim"));
        assert!(!matches("Shushan Purim", "Purim"));
        assert!(!matches("purim", "Purim"));
    }

    #[test]
    fn test_non_wildcard_is_equality() {
        let titles = ["Yom Kippur", "Erev Yom Kippur", "Sukkot I", ""];
        for t in titles {
            for p in titles {
                assert_eq!(matches(t, p), t == p, "{t:?} vs {p:?}");
            }
        }
    }

    #[test]
    fn test_prefix_and_suffix() {
        let pairs = [("Rosh Chodesh ", "Tevet"), ("Sukkot ", "III (CH''M)"), ("", "x")];
        for (a, b) in pairs {
            let title = format!("{a}{b}");
            assert!(matches(&title, &format!("{a}%")));
            assert!(matches(&title, &format!("%{b}")));
        }
        assert!(!matches("Erev Rosh Chodesh", "Rosh Chodesh%"));
    }

    #[test]
    fn test_middle_wildcard_in_order() {
        assert!(matches("Sukkot III (CH''M)", "Sukkot %(CH''M)"));
        assert!(matches("Pesach II (CH''M)", "Pesach%CH''M"));
        assert!(!matches("(CH''M) Sukkot", "Sukkot%(CH''M)"));
    }

    #[test]
    fn test_contains() {
        assert!(matches("Shabbat Mevarchim Chodesh Tevet", "%Mevarchim%"));
        assert!(!matches("Shabbat Shekalim", "%Mevarchim%"));
    }

    #[test]
    fn test_fallback_any_order() {
        // Weaker than LIKE: literals may appear in any order.
        assert!(matches("Tevet Rosh Chodesh", "%Rosh%Tevet%"));
        assert!(matches("Rosh Chodesh Tevet", "Rosh%Chodesh%Tevet"));
        assert!(!matches("Rosh Chodesh Shvat", "%Rosh%Tevet%"));
    }

    /// Postgres `LIKE` with the default `\` escape.
    fn sql_like(title: &[char], pattern: &[char]) -> bool {
        match pattern {
            [] => title.is_empty(),
            ['%', rest @ ..] => (0..=title.len()).any(|i| sql_like(&title[i..], rest)),
            ['_', rest @ ..] => !title.is_empty() && sql_like(&title[1..], rest),
            ['\\', c, rest @ ..] | [c, rest @ ..] => {
                title.first() == Some(c) && sql_like(&title[1..], rest)
            }
        }
    }

    fn like_all(title: &str, pattern: &str) -> bool {
        let title: Vec<char> = title.chars().collect();
        to_like_patterns(pattern)
            .iter()
            .all(|like| sql_like(&title, &like.chars().collect::<Vec<_>>()))
    }

    #[test]
    fn test_like_translation() {
        assert_eq!(to_like_patterns("Purim"), ["Purim"]);
        assert_eq!(to_like_patterns("Rosh Chodesh %"), ["Rosh Chodesh %"]);
        assert_eq!(to_like_patterns("Erev%Pesach"), ["%Erev%Pesach%"]);
        assert_eq!(to_like_patterns("Tish_a%"), ["Tish\\_a%"]);
        assert_eq!(to_like_patterns("%Day%of%Omer"), ["%Day%", "%of%", "%Omer%"]);
        assert_eq!(to_like_patterns("%%%"), ["%"]);
    }

    #[test]
    fn test_like_translation_agrees_with_matcher() {
        let titles = [
            "Purim",
            "Shushan Purim",
            "Erev Pesach",
            "Pesach I",
            "Tish'a B'Av",
            "Tish_a B'Av",
            "Rosh Chodesh Adar II",
            "Sukkot II (CH''M)",
            "1st day of the Omer",
            "Omer day of the 1st",
            "C:\\path",
            "",
        ];
        let patterns = [
            "Purim",
            "%Purim",
            "Purim%",
            "%Purim%",
            "Erev%Pesach",
            "Pesach%I",
            "Tish_a%",
            "Rosh Chodesh %",
            "%(CH''M)",
            "%day%Omer%",
            "%Omer%day%1st%",
            "Sukkot%II%CH",
            "C:\\%",
            "%",
            "%%",
        ];
        for title in titles {
            for pattern in patterns {
                assert_eq!(
                    like_all(title, pattern),
                    matches(title, pattern),
                    "title {title:?} pattern {pattern:?}"
                );
            }
        }
    }

    #[test]
    fn test_matcher_kinds() {
        let regex = Matcher::compile(MatchType::Regex, r"^Tzom Gedaliah( \(observed\))?$").unwrap();
        assert!(regex.is_match("Tzom Gedaliah (observed)", HolidayCategory::Fast));
        assert!(!regex.is_match("Erev Tzom Gedaliah", HolidayCategory::Fast));

        let category = Matcher::compile(MatchType::Category, "fast").unwrap();
        assert!(category.is_match("anything", HolidayCategory::Fast));
        assert!(!category.is_match("anything", HolidayCategory::Major));

        assert!(Matcher::compile(MatchType::Regex, "(").is_err());
        assert!(Matcher::compile(MatchType::Category, "holiday").is_err());
    }

    #[test]
    fn test_rank_priority_then_specificity() {
        let mut candidates = vec![
            ("category", 10, MatchType::Category),
            ("group", 10, MatchType::Regex),
            ("exact", 10, MatchType::Exact),
            ("low", 1, MatchType::Exact),
            ("high", 50, MatchType::Category),
            ("group2", 10, MatchType::Wildcard),
        ];
        rank_by(&mut candidates, |c| (c.1, c.2));
        let order: Vec<&str> = candidates.iter().map(|c| c.0).collect();
        assert_eq!(order, ["high", "exact", "group", "group2", "category", "low"]);
    }

    #[test]
    fn test_match_type_parsing() {
        assert_eq!("group".parse::<MatchType>(), Ok(MatchType::Regex));
        assert_eq!("exact".parse::<MatchType>(), Ok(MatchType::Exact));
        assert!("fuzzy".parse::<MatchType>().is_err());
    }

    #[test]
    fn test_match_event_to_tags() {
        let mappings = [
            TagEventMapping {
                tag_key: "chanukah".into(),
                pattern: "Chanukah%".into(),
                priority: 10,
            },
            TagEventMapping {
                tag_key: "rosh_chodesh".into(),
                pattern: "Rosh Chodesh%".into(),
                priority: 10,
            },
            TagEventMapping {
                tag_key: "chanukah".into(),
                pattern: "%Candles".into(),
                priority: 5,
            },
        ];
        let tags = match_event_to_tags(
            &["Rosh Chodesh Tevet", "Chanukah: 7 Candles", "Asara B'Tevet"],
            &mappings,
        );
        assert_eq!(tags, ["rosh_chodesh", "chanukah"]);
    }
}
