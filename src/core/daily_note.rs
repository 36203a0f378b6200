use chrono::NaiveDateTime;
use serde::Serialize;

use super::item::NormalizedItem;
use crate::error::Result;

/// A dated informational note, shown in calendar views as an all-day entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyNote {
    pub id: String,
    pub title: Vec<String>,
    pub body: String,
    pub date: String,
}

/// Extract daily notes (items under a `daily_notes` parent tag) within the
/// given range. An open start means "everything up to `range_end`". The
/// timestamp must be a bare single date. Sorted by date, then title.
pub fn filter_to_daily_notes(
    items: &[NormalizedItem],
    range_start: Option<NaiveDateTime>,
    range_end: NaiveDateTime,
) -> Result<Vec<DailyNote>> {
    let mut filtered = Vec::new();

    for item in items {
        if !item.has_parent_tag("daily_notes") {
            continue;
        }
        let Some(ts) = &item.timestamp else {
            continue;
        };

        let date = ts
            .as_bare_date(&item.id, "daily note")?
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let in_range = match range_start {
            Some(start) => start <= date && date <= range_end,
            None => date <= range_end,
        };
        if in_range {
            filtered.push(DailyNote {
                id: item.id.clone(),
                title: item.title.clone(),
                body: item.body.as_deref().unwrap_or("").trim().to_string(),
                date: ts.start.date.clone(),
            });
        }
    }

    filtered.sort_by(|a, b| (&a.date, &a.title).cmp(&(&b.date, &b.title)));
    Ok(filtered)
}
