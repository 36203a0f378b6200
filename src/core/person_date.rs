use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use super::item::NormalizedItem;
use super::props::{parse_advance_days, Person};
use crate::error::Result;

/// Resolves the person a file describes into their name and node id.
pub trait PersonSource {
    fn person(&self, path: &str) -> Result<Person>;
}

/// An important date about a person (birthday, anniversary, ...), surfaced
/// once its advance-notice window opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonDate {
    pub id: String,
    pub title: Vec<String>,
    pub body: String,
    pub date: String,
    pub person: Person,
}

/// Extract person-related dates (items under a `person_dates` parent tag)
/// whose advance-warning window opens on or before `until`. The timestamp
/// must be a bare single date, and the mandatory `ADVANCE` property says how
/// many days of notice the user wants. Sorted by date, title, person name.
pub fn filter_to_person_dates(
    items: &[NormalizedItem],
    until: NaiveDateTime,
    source: &dyn PersonSource,
) -> Result<Vec<PersonDate>> {
    let mut filtered = Vec::new();

    for item in items {
        if !item.has_parent_tag("person_dates") {
            continue;
        }
        let Some(ts) = &item.timestamp else {
            continue;
        };

        let date = ts.as_bare_date(&item.id, "person-related date")?;
        let advance = parse_advance_days(
            item.properties.get("ADVANCE").map(String::as_str),
            &item.id,
        )?;
        let notify_from = date.and_hms_opt(0, 0, 0).unwrap() - Duration::days(advance);

        if notify_from <= until {
            filtered.push(PersonDate {
                id: item.id.clone(),
                title: item.title.clone(),
                body: item.body.as_deref().unwrap_or("").trim().to_string(),
                date: ts.start.date.clone(),
                // The first title element would give us the name, but not the
                // person's node id, so ask the server.
                person: source.person(&item.path)?,
            });
        }
    }

    filtered.sort_by(|a, b| {
        (&a.date, &a.title, &a.person.name).cmp(&(&b.date, &b.title, &b.person.name))
    });
    Ok(filtered)
}
