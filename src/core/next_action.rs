use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::item::{index_by_source, Keyword, NormalizedItem};
use super::props::{parse_focus, parse_people, parse_time_minutes, Focus, Person};
use super::timestamp::{PlainTimestamp, TsPoint};
use crate::error::{Error, Result};

/// Effort metadata carried by tasks and problems but not projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetails {
    /// Estimated minutes of work.
    pub time: u32,
    pub focus: Focus,
    pub people: Vec<Person>,
    /// Contexts (tags) the task needs, e.g. `home`, `errands`.
    pub context: Vec<String>,
}

/// What kind of next action this is. The keyword fully determines which
/// metadata is populated, so the variants carry it rather than a bundle of
/// options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ActionKind {
    Task(TaskDetails),
    Problem(TaskDetails),
    Project,
}

/// A derived, actionable view of a normalized item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextAction {
    pub id: String,
    pub source_id: String,
    pub parent_id: Option<String>,
    /// The node's own title (final heading only).
    pub title: String,
    pub body: String,
    pub scheduled: Option<TsPoint>,
    pub deadline: Option<TsPoint>,
    pub timestamp: Option<PlainTimestamp>,
    /// Resolved from the item's ownership chain; lower is more important.
    pub priority: i64,
    pub kind: ActionKind,
}

impl NextAction {
    pub fn keyword(&self) -> Keyword {
        match self.kind {
            ActionKind::Task(_) => Keyword::Todo,
            ActionKind::Problem(_) => Keyword::Prob,
            ActionKind::Project => Keyword::Proj,
        }
    }

    pub fn details(&self) -> Option<&TaskDetails> {
        match &self.kind {
            ActionKind::Task(details) | ActionKind::Problem(details) => Some(details),
            ActionKind::Project => None,
        }
    }
}

/// Assemble a project's at-a-glance body: the project's own body, then a
/// `# TODO <title>` block per child task with the task's body underneath.
pub fn project_body(
    item: &NormalizedItem,
    by_source: &HashMap<&str, &NormalizedItem>,
) -> String {
    let mut body = match &item.body {
        Some(b) if !b.is_empty() => format!("{b}\n\n"),
        _ => String::new(),
    };

    let parts: Vec<String> = item
        .children
        .iter()
        .filter_map(|(child_id, _)| by_source.get(child_id.as_str()))
        .map(|task| {
            let mut part = format!("# TODO {}", task.heading());
            if let Some(task_body) = &task.body {
                if !task_body.is_empty() {
                    part.push('\n');
                    part.push_str(task_body);
                }
            }
            part
        })
        .collect();
    body.push_str(&parts.join("\n\n"));

    body.trim().to_string()
}

/// Walk the ownership chain looking for the nearest `PRIORITY` property.
/// The input graph is trusted to be acyclic, but a malformed one shouldn't
/// hang us, so a revisited node stops the walk.
fn resolve_priority(
    item: &NormalizedItem,
    by_source: &HashMap<&str, &NormalizedItem>,
    default_priority: i64,
) -> Result<i64> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = Some(item);

    while let Some(node) = current {
        if !seen.insert(node.source_id.as_str()) {
            log::warn!(
                "parent chain of item {} contains a cycle at {}",
                item.id,
                node.source_id
            );
            break;
        }
        if let Some(value) = node.properties.get("PRIORITY") {
            return value
                .trim()
                .parse()
                .map_err(|_| Error::parse(&node.id, "priority", value));
        }
        current = node
            .parent_id
            .as_deref()
            .and_then(|pid| by_source.get(pid).copied());
    }

    Ok(default_priority)
}

fn planning(ts: Option<&PlainTimestamp>, id: &str) -> Result<Option<TsPoint>> {
    ts.map(|t| t.as_planning(id).cloned()).transpose()
}

/// Derive next actions from normalized items: all tasks and problems, plus
/// projects that carry a scheduled date, a deadline, or a main timestamp
/// (a project with none of these cannot be "next"). Pure containers without
/// a keyword are excluded.
///
/// Validation is eager: range-valued planning timestamps, a scheduled date
/// after a deadline, and missing `TIME`/`FOCUS` on tasks are all fatal.
pub fn derive_next_actions(
    items: &[NormalizedItem],
    default_priority: i64,
) -> Result<Vec<NextAction>> {
    let by_source = index_by_source(items);

    let mut actions = Vec::new();
    for item in items {
        let Some(keyword) = item.keyword else {
            continue;
        };

        let (kind, body) = match keyword {
            // Normalization already dropped these; tolerate stray input.
            Keyword::Done => continue,
            Keyword::Proj => {
                if item.scheduled.is_none()
                    && item.deadline.is_none()
                    && item.timestamp.is_none()
                {
                    continue;
                }
                (ActionKind::Project, project_body(item, &by_source))
            }
            Keyword::Todo | Keyword::Prob => {
                let property = |key: &str| item.properties.get(key).map(String::as_str);
                let details = TaskDetails {
                    time: parse_time_minutes(property("TIME"), &item.id)?,
                    focus: parse_focus(property("FOCUS"), &item.id)?,
                    people: parse_people(property("PEOPLE"), &item.id)?,
                    context: item.tags.clone(),
                };
                let body = item.body.clone().unwrap_or_default().trim().to_string();
                let kind = match keyword {
                    Keyword::Todo => ActionKind::Task(details),
                    _ => ActionKind::Problem(details),
                };
                (kind, body)
            }
        };

        let scheduled = planning(item.scheduled.as_ref(), &item.id)?;
        let deadline = planning(item.deadline.as_ref(), &item.id)?;

        if let (Some(s), Some(d)) = (&scheduled, &deadline) {
            if s.to_datetime(&item.id)? > d.to_datetime(&item.id)? {
                return Err(Error::validation(
                    &item.id,
                    "scheduled date is after the deadline date",
                ));
            }
        }

        actions.push(NextAction {
            id: item.id.clone(),
            source_id: item.source_id.clone(),
            parent_id: item.parent_id.clone(),
            title: item.heading().to_string(),
            body,
            scheduled,
            deadline,
            timestamp: item.timestamp.clone(),
            priority: resolve_priority(item, &by_source, default_priority)?,
            kind,
        });
    }

    Ok(actions)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    pub(crate) fn item(id: &str, keyword: Option<Keyword>) -> NormalizedItem {
        NormalizedItem {
            id: format!("{id}-0"),
            source_id: id.to_string(),
            title: vec!["Actions".to_string(), format!("Heading {id}")],
            path: "actions.md".to_string(),
            parent_id: None,
            parent_tags: Vec::new(),
            tags: Vec::new(),
            body: None,
            children: Vec::new(),
            keyword,
            timestamp: None,
            scheduled: None,
            deadline: None,
            closed: None,
            properties: BTreeMap::new(),
        }
    }

    pub(crate) fn task(id: &str, time: &str, focus: &str) -> NormalizedItem {
        let mut task = item(id, Some(Keyword::Todo));
        task.properties = BTreeMap::from([
            ("TIME".to_string(), time.to_string()),
            ("FOCUS".to_string(), focus.to_string()),
        ]);
        task
    }

    fn planning_ts(date: &str, time: Option<&str>) -> PlainTimestamp {
        PlainTimestamp {
            start: TsPoint::new(date, time),
            end: None,
        }
    }

    #[test]
    fn task_metadata_is_derived_from_properties() {
        let mut t = task("a", "1hr 30m", "Med");
        t.tags = vec!["home".to_string()];
        t.properties
            .insert("PEOPLE".to_string(), "[(Person) Ada Lovelace](p1)".to_string());
        let actions = derive_next_actions(&[t], 10).unwrap();
        assert_eq!(actions.len(), 1);
        let details = actions[0].details().unwrap();
        assert_eq!(details.time, 90);
        assert_eq!(details.focus, Focus::Med);
        assert_eq!(details.people[0].name, "Ada Lovelace");
        assert_eq!(details.context, vec!["home"]);
        assert_eq!(actions[0].title, "Heading a");
    }

    #[test]
    fn task_without_time_is_fatal() {
        let mut t = item("a", Some(Keyword::Todo));
        t.properties.insert("FOCUS".to_string(), "low".to_string());
        assert!(matches!(
            derive_next_actions(&[t], 10).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn project_without_dates_or_timestamp_is_excluded() {
        let project = item("p", Some(Keyword::Proj));
        let actions = derive_next_actions(&[project], 10).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn keywordless_containers_are_excluded() {
        let container = item("c", None);
        assert!(derive_next_actions(&[container], 10).unwrap().is_empty());
    }

    #[test]
    fn scheduled_project_synthesizes_body_from_child_tasks() {
        let mut project = item("p", Some(Keyword::Proj));
        project.scheduled = Some(planning_ts("2024-06-01", None));
        project.body = Some("Overall plan.".to_string());
        project.children = vec![
            ("a".to_string(), "Heading a".to_string()),
            ("b".to_string(), "Heading b".to_string()),
        ];
        let mut child_a = task("a", "30m", "low");
        child_a.body = Some("Call first.".to_string());
        let child_b = task("b", "15m", "min");

        let actions = derive_next_actions(&[project, child_a, child_b], 10).unwrap();
        let project_action = actions.iter().find(|a| a.source_id == "p").unwrap();
        assert_eq!(
            project_action.body,
            "Overall plan.\n\n# TODO Heading a\nCall first.\n\n# TODO Heading b"
        );
        assert!(project_action.details().is_none());
    }

    #[test]
    fn range_valued_planning_timestamp_is_fatal() {
        let mut t = task("a", "30m", "low");
        t.scheduled = Some(PlainTimestamp {
            start: TsPoint::new("2024-06-01", None),
            end: Some(TsPoint::new("2024-06-02", None)),
        });
        assert!(derive_next_actions(&[t], 10).is_err());
    }

    #[test]
    fn scheduled_after_deadline_is_fatal() {
        let mut t = task("a", "30m", "low");
        t.scheduled = Some(planning_ts("2024-06-03", None));
        t.deadline = Some(planning_ts("2024-06-02", None));
        assert!(matches!(
            derive_next_actions(&[t], 10).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn scheduled_equal_to_deadline_is_allowed() {
        let mut t = task("a", "30m", "low");
        t.scheduled = Some(planning_ts("2024-06-02", None));
        t.deadline = Some(planning_ts("2024-06-02", None));
        assert!(derive_next_actions(&[t], 10).is_ok());
    }

    #[test]
    fn priority_comes_from_the_nearest_ancestor() {
        let mut parent = item("p", Some(Keyword::Proj));
        parent.properties.insert("PRIORITY".to_string(), "3".to_string());
        let mut t = task("a", "30m", "low");
        t.parent_id = Some("p".to_string());

        let actions = derive_next_actions(&[t, parent], 10).unwrap();
        assert_eq!(actions[0].priority, 3);
    }

    #[test]
    fn own_priority_wins_over_parent() {
        let mut parent = item("p", Some(Keyword::Proj));
        parent.properties.insert("PRIORITY".to_string(), "3".to_string());
        let mut t = task("a", "30m", "low");
        t.parent_id = Some("p".to_string());
        t.properties.insert("PRIORITY".to_string(), "1".to_string());

        let actions = derive_next_actions(&[t, parent], 10).unwrap();
        assert_eq!(actions[0].priority, 1);
    }

    #[test]
    fn missing_priority_falls_back_to_default() {
        let t = task("a", "30m", "low");
        let actions = derive_next_actions(&[t], 7).unwrap();
        assert_eq!(actions[0].priority, 7);
    }

    #[test]
    fn parent_cycle_stops_the_priority_walk() {
        let mut a = task("a", "30m", "low");
        a.parent_id = Some("b".to_string());
        let mut b = item("b", None);
        b.parent_id = Some("a".to_string());

        let actions = derive_next_actions(&[a, b], 10).unwrap();
        assert_eq!(actions[0].priority, 10);
    }
}
