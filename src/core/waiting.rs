use serde::Serialize;

use super::item::{Keyword, NormalizedItem};
use super::props::{parse_people, Person};
use super::surface::Planned;
use super::timestamp::{PlainTimestamp, TsPoint};
use crate::error::{Error, Result};

/// An item blocked on an external party, tracked under a `waiting` parent
/// tag. `sent` records when the request went out and is mandatory: a
/// waiting-for item you can't date is a follow-up you can't time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitingItem {
    pub id: String,
    pub source_id: String,
    pub parent_id: Option<String>,
    pub title: Vec<String>,
    pub body: Option<String>,
    pub scheduled: Option<TsPoint>,
    pub deadline: Option<TsPoint>,
    pub sent: String,
    pub people: Vec<Person>,
}

impl Planned for WaitingItem {
    fn id(&self) -> &str {
        &self.id
    }
    fn source_id(&self) -> &str {
        &self.source_id
    }
    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
    fn title(&self) -> &str {
        self.title.last().map(String::as_str).unwrap_or("")
    }
    fn keyword(&self) -> Option<Keyword> {
        None
    }
    fn timestamp(&self) -> Option<&PlainTimestamp> {
        None
    }
    fn scheduled(&self) -> Option<&TsPoint> {
        self.scheduled.as_ref()
    }
    fn deadline(&self) -> Option<&TsPoint> {
        self.deadline.as_ref()
    }
}

/// Extract waiting-for items. These go through the same planning validation
/// as next actions, and can then be narrowed to a window of concern with the
/// upcoming filter.
pub fn filter_to_waiting(items: &[NormalizedItem]) -> Result<Vec<WaitingItem>> {
    let mut filtered = Vec::new();

    for item in items {
        if !item.has_parent_tag("waiting") {
            continue;
        }

        let scheduled = item
            .scheduled
            .as_ref()
            .map(|ts| ts.as_planning(&item.id).cloned())
            .transpose()?;
        let deadline = item
            .deadline
            .as_ref()
            .map(|ts| ts.as_planning(&item.id).cloned())
            .transpose()?;

        if let (Some(s), Some(d)) = (&scheduled, &deadline) {
            if s.to_datetime(&item.id)? > d.to_datetime(&item.id)? {
                return Err(Error::validation(
                    &item.id,
                    "scheduled date is after the deadline date",
                ));
            }
        }

        let sent = item
            .properties
            .get("SENT")
            .ok_or_else(|| Error::validation(&item.id, "no SENT property"))?
            .clone();

        filtered.push(WaitingItem {
            id: item.id.clone(),
            source_id: item.source_id.clone(),
            parent_id: item.parent_id.clone(),
            title: item.title.clone(),
            body: item.body.clone(),
            scheduled,
            deadline,
            sent,
            people: parse_people(
                item.properties.get("PEOPLE").map(String::as_str),
                &item.id,
            )?,
        });
    }

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::next_action::tests::item;
    use crate::core::upcoming::{filter_to_upcoming, TypeFilter};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn waiting(id: &str, sent: Option<&str>) -> NormalizedItem {
        let mut w = item(id, None);
        w.parent_tags = vec!["waiting".to_string()];
        if let Some(sent) = sent {
            w.properties.insert("SENT".to_string(), sent.to_string());
        }
        w
    }

    #[test]
    fn only_waiting_tagged_items_qualify() {
        let items = vec![waiting("a", Some("2024-05-20")), item("b", None)];
        let out = filter_to_waiting(&items).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "a");
        assert_eq!(out[0].sent, "2024-05-20");
    }

    #[test]
    fn missing_sent_property_is_fatal() {
        let items = vec![waiting("a", None)];
        assert!(matches!(
            filter_to_waiting(&items).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn waiting_items_compose_with_the_upcoming_filter() {
        let mut w = waiting("a", Some("2024-05-20"));
        w.deadline = Some(PlainTimestamp {
            start: TsPoint::new("2024-06-05", None),
            end: None,
        });
        let items = vec![w, waiting("b", Some("2024-05-21"))];
        let waiting = filter_to_waiting(&items).unwrap();

        let until = NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let out = filter_to_upcoming(&waiting, until, TypeFilter::All).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "a");
    }
}
