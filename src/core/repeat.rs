use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::item::{Keyword, NormalizedItem};
use super::timestamp::Timestamp;
use crate::error::Result;

/// Computes the next cadence step of a repeating timestamp. The repeater
/// encoding is opaque to this crate; only the Starling server can advance it.
pub trait RecurrenceSource {
    fn next_timestamp(&self, ts: &Timestamp) -> Result<Timestamp>;
}

/// An item mid-normalization: its main timestamps have been split down to at
/// most one, but every timestamp slot still carries its repeater so the
/// expansion below can advance each cadence independently.
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub id: String,
    pub source_id: String,
    pub title: Vec<String>,
    pub path: String,
    pub parent_id: Option<String>,
    pub parent_tags: Vec<String>,
    pub tags: Vec<String>,
    pub body: Option<String>,
    pub children: Vec<(String, String)>,
    pub keyword: Option<Keyword>,
    pub timestamp: Option<Timestamp>,
    pub scheduled: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
    pub closed: Option<Timestamp>,
    pub properties: BTreeMap<String, String>,
}

impl PendingItem {
    /// Turn one materialized occurrence into its final form: repeaters
    /// stripped and the repeat index appended to the id.
    fn into_normalized(self, repeat_index: usize) -> NormalizedItem {
        NormalizedItem {
            id: format!("{}-{}", self.id, repeat_index),
            source_id: self.source_id,
            title: self.title,
            path: self.path,
            parent_id: self.parent_id,
            parent_tags: self.parent_tags,
            tags: self.tags,
            body: self.body,
            children: self.children,
            keyword: self.keyword,
            timestamp: self.timestamp.as_ref().map(Timestamp::strip),
            scheduled: self.scheduled.as_ref().map(Timestamp::strip),
            deadline: self.deadline.as_ref().map(Timestamp::strip),
            closed: self.closed.as_ref().map(Timestamp::strip),
            properties: self.properties,
        }
    }

    /// Whether any timestamp slot on this item starts on or before `until`.
    /// Once a freshly computed repeat fails this, expansion stops.
    fn has_ts_before(&self, until: NaiveDateTime) -> Result<bool> {
        for slot in [&self.timestamp, &self.scheduled, &self.deadline, &self.closed] {
            if let Some(ts) = slot {
                if ts.start.to_datetime(&self.id)? <= until {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Produce the next repeat of the given item, if there is one, by advancing
/// every repeating timestamp slot on its own cadence. Non-timestamp fields
/// are inherited untouched: a repeat differs from the original only in when
/// it occurs. Returns `None` when no slot repeats.
fn repeat_once(item: &PendingItem, source: &dyn RecurrenceSource) -> Result<Option<PendingItem>> {
    let mut next = item.clone();
    next.timestamp = None;
    next.scheduled = None;
    next.deadline = None;
    next.closed = None;

    let mut repeated = false;
    for (slot, next_slot) in [
        (&item.timestamp, &mut next.timestamp),
        (&item.scheduled, &mut next.scheduled),
        (&item.deadline, &mut next.deadline),
        (&item.closed, &mut next.closed),
    ] {
        if let Some(ts) = slot {
            if ts.has_repeater() {
                *next_slot = Some(source.next_timestamp(ts)?);
                repeated = true;
            }
        }
    }

    Ok(repeated.then_some(next))
}

/// Expand the given item into concrete occurrences up to the cutoff: the
/// seed item, then repeats for as long as some timestamp slot still starts on
/// or before `until`. Items with no repeating timestamps (including items
/// with no timestamps at all) yield exactly one occurrence.
pub fn expand_repeats(
    item: PendingItem,
    until: NaiveDateTime,
    source: &dyn RecurrenceSource,
) -> Result<Vec<NormalizedItem>> {
    let mut repeats: Vec<PendingItem> = Vec::new();

    loop {
        let next = match repeats.last() {
            None => Some(item.clone()),
            Some(last) => repeat_once(last, source)?,
        };
        match next {
            Some(next) if next.has_ts_before(until)? => repeats.push(next),
            _ => break,
        }
    }

    // An item whose only occurrence is past the cutoff still exists once.
    if repeats.is_empty() {
        repeats.push(item);
    }

    Ok(repeats
        .into_iter()
        .enumerate()
        .map(|(j, repeat)| repeat.into_normalized(j))
        .collect())
}
