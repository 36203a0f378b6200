use std::collections::HashMap;

use super::item::Keyword;
use super::next_action::NextAction;
use super::timestamp::{PlainTimestamp, TsPoint};
use crate::error::Result;

/// Anything that can flow through the surfacing/upcoming/urgent filters:
/// next actions always, waiting-for items too (they have planning dates but
/// no keyword and no main timestamp).
pub trait Planned {
    fn id(&self) -> &str;
    /// The original node id, which parent links refer to.
    fn source_id(&self) -> &str;
    fn parent_id(&self) -> Option<&str>;
    fn title(&self) -> &str;
    fn keyword(&self) -> Option<Keyword>;
    fn timestamp(&self) -> Option<&PlainTimestamp>;
    fn scheduled(&self) -> Option<&TsPoint>;
    fn deadline(&self) -> Option<&TsPoint>;
}

impl Planned for NextAction {
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
        &self.title
    }
    fn keyword(&self) -> Option<Keyword> {
        Some(self.keyword())
    }
    fn timestamp(&self) -> Option<&PlainTimestamp> {
        self.timestamp.as_ref()
    }
    fn scheduled(&self) -> Option<&TsPoint> {
        self.scheduled.as_ref()
    }
    fn deadline(&self) -> Option<&TsPoint> {
        self.deadline.as_ref()
    }
}

/// Index planned items by their source node id, first occurrence winning.
pub fn index_planned<T: Planned>(items: &[T]) -> HashMap<&str, &T> {
    let mut map = HashMap::new();
    for item in items {
        map.entry(item.source_id()).or_insert(item);
    }
    map
}

/// The timestamp that governs when an item should be worked on: its own if it
/// has one, else its parent's (projects carry timestamps that schedule their
/// children).
fn guiding_timestamp<'a, T: Planned>(
    item: &'a T,
    by_source: &HashMap<&str, &'a T>,
) -> Option<&'a PlainTimestamp> {
    item.timestamp().or_else(|| {
        item.parent_id()
            .and_then(|pid| by_source.get(pid))
            .and_then(|parent| parent.timestamp())
    })
}

/// Whether an item belongs in surfaced views at all.
///
/// An item with no guiding timestamp does. An item with one has already been
/// scheduled by the user, so it is suppressed; if it also has a deadline, the
/// plan is checked against it, and a plan that would miss the deadline gets a
/// diagnostic warning while still being suppressed (the user has actively
/// scheduled it, however imperfectly).
pub fn should_surface<T: Planned>(item: &T, by_source: &HashMap<&str, &T>) -> Result<bool> {
    let Some(guiding) = guiding_timestamp(item, by_source) else {
        return Ok(true);
    };

    let Some(deadline) = item.deadline() else {
        return Ok(false);
    };

    let (start, end) = guiding.span(item.id())?;
    let end = end.unwrap_or(start);
    let deadline = deadline.to_datetime(item.id())?;

    // Strict on the start so a plan beginning at the deadline instant is
    // flagged too.
    if !(end <= deadline && start < deadline) {
        log::warn!(
            "item '{}' ({}) is scheduled in a way that will miss its deadline",
            item.title(),
            item.id()
        );
    }

    Ok(false)
}
