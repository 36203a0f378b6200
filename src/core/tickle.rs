use chrono::NaiveDateTime;
use serde::Serialize;

use super::item::NormalizedItem;
use crate::error::Result;

/// A reminder surfaced once its date is reached, independent of task
/// mechanics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tickle {
    pub id: String,
    pub title: String,
    pub body: String,
    pub date: String,
}

/// Extract tickles (items under a `tickles` parent tag) dated up to `until`.
/// A tickle's timestamp must be a bare single date; a range or a time of day
/// is a data error. Sorted by date, then title.
pub fn filter_to_tickles(items: &[NormalizedItem], until: NaiveDateTime) -> Result<Vec<Tickle>> {
    let mut filtered = Vec::new();

    for item in items {
        if !item.has_parent_tag("tickles") {
            continue;
        }
        let Some(ts) = &item.timestamp else {
            continue;
        };

        let date = ts.as_bare_date(&item.id, "tickle")?;
        if date.and_hms_opt(0, 0, 0).unwrap() <= until {
            filtered.push(Tickle {
                id: item.id.clone(),
                title: item.heading().to_string(),
                body: item.body.as_deref().unwrap_or("").trim().to_string(),
                date: ts.start.date.clone(),
            });
        }
    }

    filtered.sort_by(|a, b| (&a.date, &a.title).cmp(&(&b.date, &b.title)));
    Ok(filtered)
}
