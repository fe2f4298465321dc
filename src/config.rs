//! Configuration types for creator-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How to handle two archive entries sanitizing to the same name
///
/// Two different items can produce identical `<owner>_<title>.<ext>` entry
/// names. The archive assembler resolves the collision according to this
/// setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCollisionAction {
    /// Write the later entry under `name (N).ext` (default)
    #[default]
    Rename,

    /// Write both entries under the same name; extractors keep the last one
    Overwrite,

    /// Drop the later entry and log a warning
    Skip,
}

/// Main configuration for the downloader
///
/// Works out of the box with zero configuration; every field has a sensible
/// default and can be set individually when deserializing from JSON/TOML.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Maximum concurrent item fetches during batch assembly (default: 4)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,

    /// Default cap on catalog size when the caller passes no limit
    /// (default: 50; `None` = resolve the full catalog)
    #[serde(default = "default_catalog_limit")]
    pub default_catalog_limit: Option<usize>,

    /// Archive entry-name collision handling
    #[serde(default)]
    pub entry_collision: EntryCollisionAction,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_channel_capacity: usize,

    /// Request timeout in seconds for the bundled HTTP content fetcher
    /// (default: 300). Custom [`ContentFetcher`](crate::source::ContentFetcher)
    /// implementations own their timeout policy and ignore this.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent(),
            default_catalog_limit: default_catalog_limit(),
            entry_collision: EntryCollisionAction::default(),
            event_channel_capacity: default_event_capacity(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Config {
    /// Validate the configuration, naming the offending key on failure
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_fetches == 0 {
            return Err(Error::Config {
                message: "max_concurrent_fetches must be at least 1".to_string(),
                key: Some("max_concurrent_fetches".to_string()),
            });
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::Config {
                message: "event_channel_capacity must be at least 1".to_string(),
                key: Some("event_channel_capacity".to_string()),
            });
        }
        if self.default_catalog_limit == Some(0) {
            return Err(Error::Config {
                message: "default_catalog_limit must be at least 1 when set".to_string(),
                key: Some("default_catalog_limit".to_string()),
            });
        }
        Ok(())
    }
}

fn default_max_concurrent() -> usize {
    4
}

fn default_catalog_limit() -> Option<usize> {
    Some(50)
}

fn default_event_capacity() -> usize {
    256
}

fn default_fetch_timeout_secs() -> u64 {
    300
}
