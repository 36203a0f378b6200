use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// How much brainpower a task needs, from "could be automated" up to "novel
/// conceptual engagement". Ordinal order matters: filters compare levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Focus {
    Min,
    Low,
    Med,
    High,
}

impl Focus {
    pub fn level(&self) -> u8 {
        match self {
            Self::Min => 0,
            Self::Low => 1,
            Self::Med => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "minimal",
            Self::Low => "low",
            Self::Med => "medium",
            Self::High => "high",
        }
    }
}

/// A person referenced from an item, resolved to their node in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub id: String,
}

/// Parse a mandatory `FOCUS` property (`min|low|med|high`, case-insensitive).
pub fn parse_focus(value: Option<&str>, id: &str) -> Result<Focus> {
    let value = value.ok_or_else(|| {
        Error::validation(id, "no focus level specified")
    })?;
    match value.to_lowercase().as_str() {
        "min" => Ok(Focus::Min),
        "low" => Ok(Focus::Low),
        "med" => Ok(Focus::Med),
        "high" => Ok(Focus::High),
        _ => Err(Error::parse(id, "focus level", value)),
    }
}

/// Parse a mandatory `TIME` property: whitespace-separated `<int>hr`/`<int>m`
/// tokens summed to total minutes.
pub fn parse_time_minutes(value: Option<&str>, id: &str) -> Result<u32> {
    let value = value.ok_or_else(|| Error::validation(id, "no time specified"))?;

    let mut total = 0u32;
    for part in value.split_whitespace() {
        let minutes = if let Some(hours) = part.strip_suffix("hr") {
            let hours: u32 = hours.parse().map_err(|_| Error::parse(id, "time", part))?;
            hours.checked_mul(60).ok_or_else(|| Error::parse(id, "time", part))?
        } else if let Some(minutes) = part.strip_suffix('m') {
            minutes.parse().map_err(|_| Error::parse(id, "time", part))?
        } else {
            return Err(Error::parse(id, "time", part));
        };
        total = total
            .checked_add(minutes)
            .ok_or_else(|| Error::parse(id, "time", value))?;
    }

    Ok(total)
}

/// Parse a mandatory `ADVANCE` property: `<int>w`/`<int>d` tokens summed to a
/// number of days of advance notice.
pub fn parse_advance_days(value: Option<&str>, id: &str) -> Result<i64> {
    let value = value.ok_or_else(|| Error::validation(id, "no advance string"))?;

    let mut days = 0i64;
    for part in value.split_whitespace() {
        if let Some(weeks) = part.strip_suffix('w') {
            let weeks: i64 = weeks.parse().map_err(|_| Error::parse(id, "advance string", part))?;
            days += weeks * 7;
        } else if let Some(d) = part.strip_suffix('d') {
            let d: i64 = d.parse().map_err(|_| Error::parse(id, "advance string", part))?;
            days += d;
        } else {
            return Err(Error::parse(id, "advance string", part));
        }
    }

    Ok(days)
}

static PERSON_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?:\(Person\) )?(?P<name>[^\]]+)\]\((?P<id>[^)]+)\)$").unwrap()
});

/// Parse a `PEOPLE` property: comma-space-separated markdown links of the
/// form `[(Person) Name](id)`. A missing property just means no people.
pub fn parse_people(value: Option<&str>, id: &str) -> Result<Vec<Person>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let mut people = Vec::new();
    for link in value.split(", ") {
        let caps = PERSON_LINK_RE
            .captures(link)
            .ok_or_else(|| Error::parse(id, "person link", link))?;
        people.push(Person {
            name: caps["name"].to_string(),
            id: caps["id"].to_string(),
        });
    }

    Ok(people)
}
