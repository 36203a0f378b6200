use thiserror::Error;

/// Everything here is fatal: a data error should stop the run and be fixed at
/// the source rather than be papered over. The only non-fatal diagnostic in
/// the crate is the surfacing warning, which goes through `log::warn!`.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed date, time, or property string on a specific node.
    #[error("invalid {what} on node '{id}': {value}")]
    Parse {
        id: String,
        what: &'static str,
        value: String,
    },

    /// A structural invariant violation, e.g. a range-valued planning
    /// timestamp or a scheduled date after a deadline.
    #[error("{msg} (node '{id}')")]
    Validation { id: String, msg: String },

    /// A failed request to the Starling server. Aborts the whole run; there
    /// is no partial-output mode.
    #[error("Starling request failed: {0}")]
    Starling(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parse(id: &str, what: &'static str, value: &str) -> Self {
        Self::Parse {
            id: id.to_string(),
            what,
            value: value.to_string(),
        }
    }

    pub fn validation(id: &str, msg: impl Into<String>) -> Self {
        Self::Validation {
            id: id.to_string(),
            msg: msg.into(),
        }
    }
}
