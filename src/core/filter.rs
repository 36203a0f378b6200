use std::collections::HashSet;

use super::next_action::NextAction;
use super::props::Focus;

/// What the user has available right now: the contexts they're in, the people
/// around them, and ceilings on time and focus. Empty lists mean "don't
/// filter on this axis".
#[derive(Debug, Clone, Default)]
pub struct Availability {
    pub contexts: Vec<String>,
    pub people: Vec<String>,
    pub max_time: Option<u32>,
    pub max_focus: Option<Focus>,
}

/// An item's requirement list is an AND-list: every context (or person) it
/// needs must be available, and, when filtering on an axis at all, the item
/// must actually need at least one thing on that axis (items needing none are
/// typically person-bound and shouldn't show up in a context-filtered view).
fn matches_and_list(needed: &[String], available: &HashSet<&str>) -> bool {
    !needed.is_empty() && needed.iter().all(|n| available.contains(n.as_str()))
}

/// Filter next actions down to what can actually be done now. Projects are
/// skipped outright: they carry no effort metadata and only matter to the
/// upcoming/urgent views. The result is sorted by title.
pub fn filter_by_availability(
    actions: &[NextAction],
    availability: &Availability,
) -> Vec<NextAction> {
    let contexts: HashSet<&str> = availability.contexts.iter().map(String::as_str).collect();
    let people: HashSet<&str> = availability.people.iter().map(String::as_str).collect();

    let mut filtered: Vec<NextAction> = actions
        .iter()
        .filter(|action| {
            let Some(details) = action.details() else {
                return false;
            };
            if !contexts.is_empty() && !matches_and_list(&details.context, &contexts) {
                return false;
            }
            if !people.is_empty() {
                let needed: Vec<String> =
                    details.people.iter().map(|p| p.name.clone()).collect();
                if !matches_and_list(&needed, &people) {
                    return false;
                }
            }
            if availability.max_time.is_some_and(|max| details.time > max) {
                return false;
            }
            if availability.max_focus.is_some_and(|max| details.focus > max) {
                return false;
            }
            true
        })
        .cloned()
        .collect();

    filtered.sort_by(|a, b| a.title.cmp(&b.title));
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::Keyword;
    use crate::core::next_action::tests::{item, task};
    use crate::core::next_action::derive_next_actions;
    use crate::core::timestamp::{PlainTimestamp, TsPoint};
    use pretty_assertions::assert_eq;

    fn with_contexts(id: &str, contexts: &[&str]) -> crate::core::item::NormalizedItem {
        let mut t = task(id, "30m", "low");
        t.tags = contexts.iter().map(|c| c.to_string()).collect();
        t
    }

    fn availability(contexts: &[&str]) -> Availability {
        Availability {
            contexts: contexts.iter().map(|c| c.to_string()).collect(),
            ..Availability::default()
        }
    }

    #[test]
    fn all_needed_contexts_must_be_available() {
        let actions = derive_next_actions(
            &[
                with_contexts("both", &["home", "computer"]),
                with_contexts("other", &["errands"]),
                with_contexts("none", &[]),
            ],
            10,
        )
        .unwrap();

        let out = filter_by_availability(&actions, &availability(&["home", "computer"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "both");
    }

    #[test]
    fn no_filters_means_everything_but_projects() {
        let mut project = item("p", Some(Keyword::Proj));
        project.scheduled = Some(PlainTimestamp {
            start: TsPoint::new("2024-06-01", None),
            end: None,
        });
        let actions =
            derive_next_actions(&[task("a", "30m", "low"), project], 10).unwrap();
        let out = filter_by_availability(&actions, &Availability::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "a");
    }

    #[test]
    fn time_and_focus_are_ceilings() {
        let actions = derive_next_actions(
            &[
                task("quick", "15m", "min"),
                task("slow", "2hr", "min"),
                task("deep", "15m", "high"),
            ],
            10,
        )
        .unwrap();

        let out = filter_by_availability(
            &actions,
            &Availability {
                max_time: Some(30),
                max_focus: Some(Focus::Med),
                ..Availability::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "quick");
    }

    #[test]
    fn people_filter_requires_everyone_needed() {
        let mut pair = task("pair", "30m", "low");
        pair.properties.insert(
            "PEOPLE".to_string(),
            "[(Person) Ada Lovelace](p1), [(Person) Alan Turing](p2)".to_string(),
        );
        let mut solo = task("solo", "30m", "low");
        solo.properties
            .insert("PEOPLE".to_string(), "[(Person) Ada Lovelace](p1)".to_string());

        let actions = derive_next_actions(&[pair, solo], 10).unwrap();
        let out = filter_by_availability(
            &actions,
            &Availability {
                people: vec!["Ada Lovelace".to_string()],
                ..Availability::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_id, "solo");
    }

    #[test]
    fn result_is_sorted_by_title() {
        let actions =
            derive_next_actions(&[task("b", "30m", "low"), task("a", "30m", "low")], 10)
                .unwrap();
        let out = filter_by_availability(&actions, &Availability::default());
        let titles: Vec<&str> = out.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Heading a", "Heading b"]);
    }
}
