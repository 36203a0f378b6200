use chrono::NaiveDateTime;

use super::surface::Planned;
use crate::error::Result;

/// Filter already-upcoming items down to those urgent within a proximity
/// window: only deadline-bearing items, only once their scheduled date has
/// been reached, and only if the deadline falls on or before the cutoff.
///
/// Meant to run on the upcoming filter's output; it keeps that ordering and
/// does no sorting of its own.
pub fn filter_to_urgent<T: Planned + Clone>(
    upcoming: &[T],
    current: NaiveDateTime,
    cutoff: NaiveDateTime,
) -> Result<Vec<T>> {
    let mut filtered = Vec::new();

    for item in upcoming {
        // Anything without a deadline will never be urgent.
        let Some(deadline) = item.deadline() else {
            continue;
        };
        let deadline = deadline.to_datetime(item.id())?;

        // Not yet actionable: the user said not to start before the
        // scheduled date. (Derivation guarantees the deadline is after it.)
        if let Some(scheduled) = item.scheduled() {
            if scheduled.to_datetime(item.id())? > current {
                continue;
            }
        }
        // Too far out to worry about in the field.
        if deadline > cutoff {
            continue;
        }

        filtered.push(item.clone());
    }

    Ok(filtered)
}
