//! 人間向けのテキスト出力。

use std::fmt::Write as _;

use zmanim_calendar::audit::AuditReport;
use zmanim_calendar::{ActiveEvent, DayContext, WeekInfo};

fn event_line(out: &mut String, event: &ActiveEvent) {
    let _ = write!(
        out,
        "  {} ({} / {}) day {}/{}",
        event.event_code, event.name_english, event.name_hebrew, event.day_number, event.total_days
    );
    if event.is_final_day {
        out.push_str(" final");
    }
    if let Some(fast) = event.fast_start_type {
        let _ = write!(out, " fast from {}", fast.as_str());
    }
    out.push('\n');
}

fn section(out: &mut String, title: &str, events: &[ActiveEvent]) {
    if events.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for event in events {
        event_line(out, event);
    }
}

pub fn day_context(ctx: &DayContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {} / {}",
        ctx.gregorian_date, ctx.hebrew_date.formatted, ctx.hebrew_date.hebrew
    );

    let flags: Vec<&str> = [
        (ctx.is_shabbat, "shabbat"),
        (ctx.is_yom_tov, "yom tov"),
        (ctx.is_fast_day, "fast"),
        (ctx.is_in_israel, "israel"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if !flags.is_empty() {
        let _ = writeln!(out, "[{}]", flags.join(", "));
    }

    for holiday in &ctx.holidays {
        let _ = writeln!(out, "- {} ({})", holiday.name, holiday.category);
    }
    section(&mut out, "Active", &ctx.active_events);
    section(&mut out, "Begins tonight", &ctx.erev_events);
    section(&mut out, "Ends tonight", &ctx.motzei_events);
    if !ctx.special_contexts.is_empty() {
        let _ = writeln!(out, "Contexts: {}", ctx.special_contexts.join(", "));
    }
    out.trim_end().to_string()
}

pub fn week(week: &WeekInfo) -> String {
    let mut out = String::new();
    for day in &week.days {
        let names: Vec<&str> = day.holidays.iter().map(|h| h.name.as_str()).collect();
        let _ = writeln!(
            out,
            "{} {:<9} {:<18} {}",
            day.date,
            day.day_name_english,
            day.hebrew_date.formatted,
            names.join(", ")
        );
    }
    out.trim_end().to_string()
}

pub fn audit(report: &AuditReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} events, {} unique, {} mapped, {} unmapped ({:.1}% coverage)",
        report.total_events,
        report.unique_events,
        report.mapped,
        report.unmapped,
        report.coverage_percent
    );
    for (match_type, count) in &report.by_match_type {
        let _ = writeln!(out, "  {match_type}: {count}");
    }
    for (category, coverage) in &report.by_category {
        let _ = writeln!(
            out,
            "  [{category}] {}/{} mapped",
            coverage.mapped, coverage.total
        );
    }
    if !report.unmapped_events.is_empty() {
        out.push_str("Unmapped:\n");
        for event in &report.unmapped_events {
            let _ = writeln!(
                out,
                "  {} ({}) x{} first {}",
                event.title, event.category, event.occurrences, event.first_date
            );
        }
    }
    if !report.unused_tags.is_empty() {
        let _ = writeln!(out, "Unused tags: {}", report.unused_tags.join(", "));
    }
    if !report.catalog_issues.is_empty() {
        out.push_str("Catalog issues:\n");
        for issue in &report.catalog_issues {
            let _ = writeln!(out, "  {issue}");
        }
    }
    out.trim_end().to_string()
}
