use chrono::NaiveDateTime;
use serde::Serialize;

use super::item::{index_by_source, Keyword, NormalizedItem};
use super::next_action::project_body;
use super::props::{parse_people, Person};
use super::timestamp::{PlainTimestamp, TsPoint};
use crate::error::Result;

/// A presentation-ready calendar entry: an event or a scheduled work block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub location: Option<String>,
    pub people: Vec<Person>,
    pub start: TsPoint,
    pub end: Option<TsPoint>,
}

fn in_range(
    ts: &PlainTimestamp,
    id: &str,
    range_start: Option<NaiveDateTime>,
    range_end: NaiveDateTime,
) -> Result<bool> {
    let (start, end) = ts.span(id)?;
    let end = end.unwrap_or(start);
    Ok(match range_start {
        Some(range_start) => start <= range_end && end >= range_start,
        None => start <= range_end,
    })
}

/// Filter items down to calendar entries in the given datetime range. Dates
/// about people, tickles, and daily notes have their own views and are
/// excluded here. Scheduled projects get their at-a-glance body of child
/// tasks. Sorted by start date, start time (timeless entries first), title.
pub fn filter_to_calendar(
    items: &[NormalizedItem],
    range_start: Option<NaiveDateTime>,
    range_end: NaiveDateTime,
) -> Result<Vec<CalendarItem>> {
    let by_source = index_by_source(items);

    let mut entries = Vec::new();
    for item in items {
        if item.has_parent_tag("person_dates")
            || item.has_parent_tag("tickles")
            || item.has_parent_tag("daily_notes")
        {
            continue;
        }
        let Some(ts) = &item.timestamp else {
            continue;
        };
        if !in_range(ts, &item.id, range_start, range_end)? {
            continue;
        }

        let body = if item.keyword == Some(Keyword::Proj) {
            project_body(item, &by_source)
        } else {
            item.body.as_deref().unwrap_or("").trim().to_string()
        };

        entries.push(CalendarItem {
            id: item.id.clone(),
            title: item.heading().to_string(),
            body,
            location: item.properties.get("LOCATION").cloned(),
            people: parse_people(
                item.properties.get("PEOPLE").map(String::as_str),
                &item.id,
            )?,
            start: ts.start.clone(),
            end: ts.end.clone(),
        });
    }

    entries.sort_by(|a, b| {
        let key = |entry: &CalendarItem| {
            (
                entry.start.date.clone(),
                entry.start.time.clone().unwrap_or_else(|| "00:00".to_string()),
                entry.title.clone(),
            )
        };
        key(a).cmp(&key(b))
    });
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::next_action::tests::{item, task};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn timestamped(id: &str, date: &str, time: Option<&str>) -> NormalizedItem {
        let mut t = item(id, None);
        t.timestamp = Some(PlainTimestamp {
            start: TsPoint::new(date, time),
            end: None,
        });
        t
    }

    fn day(date: &str, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn only_timestamped_items_in_range_appear() {
        let items = vec![
            timestamped("a", "2024-06-10", Some("09:00:00")),
            timestamped("b", "2024-07-10", None),
            item("c", None),
        ];
        let out = filter_to_calendar(
            &items,
            Some(day("2024-06-01", 0, 0, 0)),
            day("2024-06-30", 23, 59, 59),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a-0");
    }

    #[test]
    fn ranged_timestamps_intersect_the_window() {
        let mut spanning = timestamped("a", "2024-05-28", None);
        spanning.timestamp.as_mut().unwrap().end = Some(TsPoint::new("2024-06-02", None));
        let out = filter_to_calendar(
            &[spanning],
            Some(day("2024-06-01", 0, 0, 0)),
            day("2024-06-30", 23, 59, 59),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn side_channel_families_are_excluded() {
        let mut tickle = timestamped("a", "2024-06-10", None);
        tickle.parent_tags = vec!["tickles".to_string()];
        let out =
            filter_to_calendar(&[tickle], None, day("2024-06-30", 23, 59, 59)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn scheduled_projects_carry_their_task_summary() {
        let mut project = item("p", Some(Keyword::Proj));
        project.timestamp = Some(PlainTimestamp {
            start: TsPoint::new("2024-06-10", Some("09:00:00")),
            end: Some(TsPoint::new("2024-06-10", Some("11:00:00"))),
        });
        project.children = vec![("a".to_string(), "Heading a".to_string())];
        let child = task("a", "30m", "low");

        let out = filter_to_calendar(
            &[project, child],
            None,
            day("2024-06-30", 23, 59, 59),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        let project_entry = out.iter().find(|e| e.id == "p-0").unwrap();
        assert_eq!(project_entry.body, "# TODO Heading a");
    }

    #[test]
    fn timeless_entries_sort_before_timed_ones_on_the_same_day() {
        let items = vec![
            timestamped("a", "2024-06-10", Some("09:00:00")),
            timestamped("b", "2024-06-10", None),
        ];
        let out = filter_to_calendar(&items, None, day("2024-06-30", 23, 59, 59)).unwrap();
        assert_eq!(out[0].id, "b-0");
    }
}
