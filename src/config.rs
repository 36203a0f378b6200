use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_starling_api() -> String {
    "http://localhost:3000".to_string()
}

fn default_priority() -> i64 {
    10
}

fn default_expand_advance_days() -> i64 {
    14
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Config {
    /// Base URL of the Starling server holding the note graph.
    #[serde(default = "default_starling_api")]
    pub starling_api: String,
    /// Priority assumed for items whose ownership chain declares none.
    /// Lower is more important.
    #[serde(default = "default_priority")]
    pub default_priority: i64,
    /// How many days past the current date to expand repeats when no
    /// explicit cutoff is given.
    #[serde(default = "default_expand_advance_days")]
    pub expand_advance_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starling_api: default_starling_api(),
            default_priority: default_priority(),
            expand_advance_days: default_expand_advance_days(),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("starling-actions").join("config.json"))
    }

    /// Load the config file if it exists, falling back to defaults. The
    /// `STARLING_API` environment variable overrides the server URL either way.
    pub fn load() -> Self {
        let mut config: Self = Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        if let Ok(url) = std::env::var("STARLING_API") {
            config.starling_api = url;
        }

        config
    }
}
