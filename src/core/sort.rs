use super::next_action::NextAction;
use super::timestamp::TsPoint;

/// Sentinel sorting after any real date or time, so undated items come last.
const FAR_FUTURE: &str = "9999";

fn date_key(point: Option<&TsPoint>) -> String {
    point.map(|p| p.date.clone()).unwrap_or_else(|| FAR_FUTURE.to_string())
}

fn time_key(point: Option<&TsPoint>) -> String {
    point
        .and_then(|p| p.time.clone())
        .unwrap_or_else(|| FAR_FUTURE.to_string())
}

/// The general next-action ordering (distinct from the upcoming filter's
/// scheduled-first order): deadline first, then scheduled date, then
/// priority (lower is more important), then title. The sort is stable, so
/// sorting an already-sorted list is a no-op.
pub fn sort_actions(actions: &mut [NextAction]) {
    actions.sort_by_key(|action| {
        (
            date_key(action.deadline.as_ref()),
            time_key(action.deadline.as_ref()),
            date_key(action.scheduled.as_ref()),
            time_key(action.scheduled.as_ref()),
            action.priority,
            action.title.clone(),
        )
    });
}
