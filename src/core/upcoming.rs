use chrono::NaiveDateTime;

use super::item::Keyword;
use super::surface::{index_planned, should_surface, Planned};
use crate::error::Result;

/// Narrow the upcoming view to one keyword family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Tasks,
    Problems,
}

impl TypeFilter {
    fn admits(&self, keyword: Option<Keyword>) -> bool {
        match self {
            Self::All => true,
            Self::Tasks => keyword == Some(Keyword::Todo),
            Self::Problems => keyword == Some(Keyword::Prob),
        }
    }
}

/// Filter to items that are upcoming with respect to `until`: scheduled items
/// whose scheduled date falls within the window, and deadline-only items at
/// any time (a dangling deadline is always upcoming). Both cases first check
/// the surfacing filter, so anything the user has already planned via a
/// guiding timestamp stays out of the view.
///
/// Items with neither a scheduled date nor a deadline are never upcoming.
///
/// The result is sorted by whichever date governs appearance (scheduled,
/// else deadline), then by deadline as tiebreak context, then title.
pub fn filter_to_upcoming<T: Planned + Clone>(
    items: &[T],
    until: NaiveDateTime,
    ty: TypeFilter,
) -> Result<Vec<T>> {
    let by_source = index_planned(items);

    let mut filtered: Vec<T> = Vec::new();
    for item in items {
        if !ty.admits(item.keyword()) {
            continue;
        }

        if let Some(scheduled) = item.scheduled() {
            // Guaranteed a single point by next-action derivation.
            let scheduled_dt = scheduled.to_datetime(item.id())?;
            if !should_surface(item, &by_source)? {
                continue;
            }
            if scheduled_dt <= until {
                filtered.push(item.clone());
            }
        } else if item.deadline().is_some() {
            if !should_surface(item, &by_source)? {
                continue;
            }
            filtered.push(item.clone());
        }
    }

    filtered.sort_by_key(|item| {
        let scheduled = item.scheduled();
        let deadline = item.deadline();
        let time_of = |point: Option<&super::timestamp::TsPoint>| {
            point
                .and_then(|p| p.time.clone())
                .unwrap_or_default()
        };
        (
            scheduled
                .or(deadline)
                .map(|p| p.date.clone())
                .unwrap_or_default(),
            if scheduled.is_some() {
                time_of(scheduled)
            } else {
                time_of(deadline)
            },
            deadline.map(|p| p.date.clone()).unwrap_or_default(),
            time_of(deadline),
            item.title().to_string(),
        )
    });

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::next_action::tests::task;
    use crate::core::next_action::{derive_next_actions, NextAction};
    use crate::core::item::NormalizedItem;
    use crate::core::timestamp::{PlainTimestamp, TsPoint};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn planning(date: &str, time: Option<&str>) -> PlainTimestamp {
        PlainTimestamp {
            start: TsPoint::new(date, time),
            end: None,
        }
    }

    fn actions(items: Vec<NormalizedItem>) -> Vec<NextAction> {
        derive_next_actions(&items, 10).unwrap()
    }

    fn until(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
    }

    #[test]
    fn undated_items_are_never_upcoming() {
        let actions = actions(vec![task("a", "30m", "low")]);
        let out = filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::All).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn scheduled_within_window_is_upcoming() {
        let mut near = task("a", "30m", "low");
        near.scheduled = Some(planning("2024-06-10", None));
        let mut far = task("b", "30m", "low");
        far.scheduled = Some(planning("2024-07-10", None));

        let actions = actions(vec![near, far]);
        let out = filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::All).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "a");
    }

    #[test]
    fn dangling_deadline_is_always_upcoming() {
        let mut t = task("a", "30m", "low");
        t.deadline = Some(planning("2025-01-01", None));
        let actions = actions(vec![t]);
        let out = filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::All).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn guiding_timestamp_suppresses_scheduled_items() {
        let mut t = task("a", "30m", "low");
        t.scheduled = Some(planning("2024-06-10", None));
        t.timestamp = Some(PlainTimestamp {
            start: TsPoint::new("2024-06-09", None),
            end: None,
        });
        let actions = actions(vec![t]);
        let out = filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::All).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn type_filter_narrows_by_keyword() {
        let mut t = task("a", "30m", "low");
        t.scheduled = Some(planning("2024-06-10", None));
        let mut p = task("b", "30m", "low");
        p.keyword = Some(crate::core::item::Keyword::Prob);
        p.scheduled = Some(planning("2024-06-10", None));

        let actions = actions(vec![t, p]);
        let tasks =
            filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::Tasks).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].source_id, "a");
        let problems =
            filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::Problems).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].source_id, "b");
    }

    #[test]
    fn governing_date_orders_the_result() {
        let mut by_deadline = task("a", "30m", "low");
        by_deadline.deadline = Some(planning("2024-06-08", None));
        let mut by_schedule = task("b", "30m", "low");
        by_schedule.scheduled = Some(planning("2024-06-09", None));
        let mut early = task("c", "30m", "low");
        early.scheduled = Some(planning("2024-06-07", Some("08:00:00")));

        let actions = actions(vec![by_deadline, by_schedule, early]);
        let out = filter_to_upcoming(&actions, until("2024-06-30"), TypeFilter::All).unwrap();
        let order: Vec<&str> = out.iter().map(|a| a.source_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
