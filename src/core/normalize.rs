use chrono::NaiveDateTime;

use super::item::{Keyword, NormalizedItem, RawItem};
use super::repeat::{expand_repeats, PendingItem, RecurrenceSource};
use super::timestamp::Timestamp;
use crate::error::Result;

/// Discard inactive planning timestamps; anything surviving this point is
/// implicitly active.
fn prune_inactive(ts: Option<Timestamp>) -> Option<Timestamp> {
    ts.filter(|t| t.active)
}

fn pending(item: &RawItem, id: String, timestamp: Option<Timestamp>) -> PendingItem {
    PendingItem {
        id,
        source_id: item.id.clone(),
        title: item.title.clone(),
        path: item.path.clone(),
        parent_id: item.parent_id.clone(),
        parent_tags: item.parent_tags.clone(),
        tags: item.tags.clone(),
        body: item.body.clone(),
        children: item.children.clone(),
        keyword: item.metadata.keyword,
        timestamp,
        scheduled: prune_inactive(item.metadata.scheduled.clone()),
        deadline: prune_inactive(item.metadata.deadline.clone()),
        closed: prune_inactive(item.metadata.closed.clone()),
        properties: item.metadata.properties.clone(),
    }
}

/// Normalize the raw item list so downstream filters never see completed
/// items, inactive or multiple main timestamps, or repeats:
///
/// 1. items with keyword `DONE` are dropped entirely (they stay indexed on
///    the server side);
/// 2. inactive planning timestamps are pruned;
/// 3. each active main timestamp is split out into its own clone of the item
///    (id suffixed with the timestamp index) and expanded up to `until`;
/// 4. items with no main timestamps still go through expansion so repeating
///    scheduled/deadline timestamps are honored.
///
/// Output preserves input order; sorting is a downstream concern.
pub fn normalize(
    raw_items: &[RawItem],
    until: NaiveDateTime,
    source: &dyn RecurrenceSource,
) -> Result<Vec<NormalizedItem>> {
    let mut expanded = Vec::new();

    for item in raw_items {
        if item.metadata.keyword.is_some_and(|k| k.is_done()) {
            continue;
        }

        for (i, ts) in item.metadata.timestamps.iter().enumerate() {
            if !ts.active {
                continue;
            }
            let split = pending(item, format!("{}-{}", item.id, i), Some(ts.clone()));
            expanded.extend(expand_repeats(split, until, source)?);
        }

        if item.metadata.timestamps.is_empty() {
            let split = pending(item, item.id.clone(), None);
            expanded.extend(expand_repeats(split, until, source)?);
        }
    }

    Ok(expanded)
}
