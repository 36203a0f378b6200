use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single date with an optional time, exactly as Starling serializes them
/// (`YYYY-MM-DD` and `HH:MM:SS`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TsPoint {
    pub date: String,
    pub time: Option<String>,
}

impl TsPoint {
    pub fn new(date: &str, time: Option<&str>) -> Self {
        Self {
            date: date.to_string(),
            time: time.map(str::to_string),
        }
    }

    /// Parse into a comparable datetime; a missing time means midnight. The
    /// node id is only used for diagnostics.
    pub fn to_datetime(&self, id: &str) -> Result<NaiveDateTime> {
        let date = parse_date(id, &self.date)?;
        let time = match &self.time {
            Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
                .map_err(|_| Error::parse(id, "time", t))?,
            None => NaiveTime::MIN,
        };
        Ok(date.and_time(time))
    }

    pub fn to_date(&self, id: &str) -> Result<NaiveDate> {
        parse_date(id, &self.date)
    }
}

pub fn parse_date(id: &str, date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| Error::parse(id, "date", date))
}

/// A timestamp as it arrives from the server. `active: false` marks a purely
/// informational timestamp that must be pruned before normalization;
/// `repeater` is an opaque cadence only the server knows how to advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub start: TsPoint,
    pub end: Option<TsPoint>,
    pub active: bool,
    #[serde(default)]
    pub repeater: Option<serde_json::Value>,
}

impl Timestamp {
    pub fn has_repeater(&self) -> bool {
        self.repeater.is_some()
    }

    /// Drop the activity flag and repeater, leaving a concrete occurrence.
    pub fn strip(&self) -> PlainTimestamp {
        PlainTimestamp {
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

/// A materialized timestamp on a normalized item: always active, and never
/// recurring (the repeater is a generator input, not part of an occurrence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainTimestamp {
    pub start: TsPoint,
    pub end: Option<TsPoint>,
}

impl PlainTimestamp {
    /// Resolve the start and optional end into comparable datetimes.
    pub fn span(&self, id: &str) -> Result<(NaiveDateTime, Option<NaiveDateTime>)> {
        let start = self.start.to_datetime(id)?;
        let end = match &self.end {
            Some(e) => Some(e.to_datetime(id)?),
            None => None,
        };
        Ok((start, end))
    }

    /// Planning timestamps (scheduled/deadline) must be a single point in
    /// time; a range is a data error.
    pub fn as_planning(&self, id: &str) -> Result<&TsPoint> {
        if self.end.is_some() {
            return Err(Error::validation(
                id,
                "planning timestamp spans a range, which is not allowed",
            ));
        }
        Ok(&self.start)
    }

    /// Some item families (tickles, daily notes, person dates) only admit a
    /// bare date: no end, no time.
    pub fn as_bare_date(&self, id: &str, what: &str) -> Result<NaiveDate> {
        if self.end.is_some() {
            return Err(Error::validation(id, format!("{what} has an end timestamp")));
        }
        if self.start.time.is_some() {
            return Err(Error::validation(
                id,
                format!("{what} has a timestamp with a time"),
            ));
        }
        self.start.to_date(id)
    }
}
