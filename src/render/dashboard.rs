use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

use crate::core::item::Keyword;
use crate::core::next_action::NextAction;
use crate::core::timestamp::TsPoint;
use crate::error::Result;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Format a date for human reading, relative to the current date. The
/// connective ("on", "for") is used when naming a specific weekday, chosen to
/// fit whatever precedes it ("Scheduled for Thursday", "Due on Wednesday").
pub fn format_date(
    point: &TsPoint,
    id: &str,
    current_date: NaiveDate,
    connective: &str,
) -> Result<String> {
    let date = point.to_date(id)?;
    let days = (date - current_date).num_days();
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];

    let mut formatted = match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        2..7 => format!("{connective} {weekday}"),
        -6..0 => format!("last {weekday}"),
        7..14 => format!("next {weekday}"),
        _ => format!("{connective} {weekday} {}", date.format("%d/%m/%Y")),
    };
    if let Some(time) = &point.time {
        formatted.push_str(&format!(" at {time}"));
    }
    Ok(formatted)
}

/// Format a minute count the way the TIME property is written: `1hr 30m`.
pub fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}hr"),
        (h, m) => format!("{h}hr {m}m"),
    }
}

/// Render next actions as a plain-text dashboard, with dates formatted
/// relative to the current date. Priorities are only shown when they differ
/// from the default (everything is "normal priority" until the user says
/// otherwise).
pub fn display_actions(
    actions: &[NextAction],
    current_date: NaiveDate,
    default_priority: i64,
) -> Result<String> {
    let mut out = String::new();

    for action in actions {
        if action.keyword() == Keyword::Prob {
            let _ = writeln!(out, "→ Problem: {}", action.title);
        } else {
            let _ = writeln!(out, "→ {}", action.title);
        }

        if action.timestamp.is_some() {
            out.push_str("  Has a timestamp attached.\n");
        }
        if let Some(scheduled) = &action.scheduled {
            let _ = writeln!(
                out,
                "  Scheduled {}",
                format_date(scheduled, &action.id, current_date, "for")?
            );
        }
        if let Some(deadline) = &action.deadline {
            let _ = writeln!(
                out,
                "  Due {}",
                format_date(deadline, &action.id, current_date, "on")?
            );
        }
        if action.priority != default_priority {
            let _ = writeln!(out, "  Priority: {}", action.priority);
        }

        if let Some(details) = action.details() {
            let context = if details.context.is_empty() {
                "none".to_string()
            } else {
                details.context.join(", ")
            };
            let _ = writeln!(out, "  Context: {context}");
            let _ = writeln!(out, "  Focus: {}", details.focus.as_str());
            let _ = writeln!(out, "  Time: {}", format_minutes(details.time));
            if !details.people.is_empty() {
                out.push_str("  People needed:\n");
                for person in &details.people {
                    let _ = writeln!(out, "    - {}", person.name);
                }
            }
        }

        if !action.body.is_empty() {
            let _ = writeln!(out, "\n{}", action.body);
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn current() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn fmt(date: &str, time: Option<&str>, connective: &str) -> String {
        format_date(&TsPoint::new(date, time), "n", current(), connective).unwrap()
    }

    #[test]
    fn nearby_dates_use_relative_names() {
        assert_eq!(fmt("2024-06-03", None, "on"), "today");
        assert_eq!(fmt("2024-06-04", None, "on"), "tomorrow");
        assert_eq!(fmt("2024-06-02", None, "on"), "yesterday");
        assert_eq!(fmt("2024-06-06", None, "on"), "on Thursday");
        assert_eq!(fmt("2024-05-31", None, "on"), "last Friday");
        assert_eq!(fmt("2024-06-12", None, "on"), "next Wednesday");
    }

    #[test]
    fn distant_dates_spell_everything_out() {
        assert_eq!(fmt("2024-07-10", None, "for"), "for Wednesday 10/07/2024");
    }

    #[test]
    fn times_are_appended() {
        assert_eq!(fmt("2024-06-04", Some("09:30:00"), "on"), "tomorrow at 09:30:00");
    }

    #[test]
    fn minutes_format_like_the_time_property() {
        assert_eq!(format_minutes(90), "1hr 30m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2hr");
    }
}
