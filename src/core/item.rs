use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::timestamp::{PlainTimestamp, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "PROJ")]
    Proj,
    #[serde(rename = "PROB")]
    Prob,
    #[serde(rename = "DONE")]
    Done,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Proj => "PROJ",
            Self::Prob => "PROB",
            Self::Done => "DONE",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Item metadata as returned by the Starling action-items index. Completed
/// items are still indexed, so `keyword` may be `DONE`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMetadata {
    pub keyword: Option<Keyword>,
    /// The item's "main" timestamps (when the item occurs), as opposed to the
    /// planning timestamps below.
    #[serde(default)]
    pub timestamps: Vec<Timestamp>,
    pub scheduled: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
    pub closed: Option<Timestamp>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// An action item exactly as the server sends it. `title` is the ordered
/// chain of headings down to the node, last entry being the node's own title.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub title: Vec<String>,
    #[serde(default)]
    pub path: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub parent_tags: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// `(id, title)` pairs of the node's direct children.
    #[serde(default)]
    pub children: Vec<(String, String)>,
    pub metadata: RawMetadata,
}

/// A raw item after normalization: repeat-free, with at most one main
/// timestamp, inactive planning timestamps stripped, and never `DONE`.
///
/// `id` carries the occurrence suffixes (`-{timestamp_index}` when main
/// timestamps were split, `-{repeat_index}` always), so each concrete
/// occurrence is independently addressable. `source_id` keeps the original
/// node id for parent/child lookups, which the graph expresses in terms of
/// unsuffixed ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedItem {
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
    pub timestamp: Option<PlainTimestamp>,
    pub scheduled: Option<PlainTimestamp>,
    pub deadline: Option<PlainTimestamp>,
    pub closed: Option<PlainTimestamp>,
    pub properties: BTreeMap<String, String>,
}

impl NormalizedItem {
    /// The node's own title, i.e. the last heading in the chain.
    pub fn heading(&self) -> &str {
        self.title.last().map(String::as_str).unwrap_or("")
    }

    pub fn has_parent_tag(&self, tag: &str) -> bool {
        self.parent_tags.iter().any(|t| t == tag)
    }
}

/// Index items by their original node id. Repeat occurrences share a source
/// id; the first occurrence wins, which is always the earliest one.
pub fn index_by_source(items: &[NormalizedItem]) -> HashMap<&str, &NormalizedItem> {
    let mut map = HashMap::new();
    for item in items {
        map.entry(item.source_id.as_str()).or_insert(item);
    }
    map
}
