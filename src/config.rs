//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file,
//! `WALRUS_WATCH_*` environment variables, then command-line flags (applied
//! by the binary).
//!
//! ```toml
//! stats_url = "https://walrus-stats.brightlystake.com"
//! network_url = "https://walrus.brightlystake.com"
//! tick_ms = 100
//! log_file = "/tmp/walrus-watch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::source::{DEFAULT_NETWORK_URL, DEFAULT_STATS_URL};

/// Prefix for environment overrides, e.g. `WALRUS_WATCH_STATS_URL`.
pub const ENV_PREFIX: &str = "WALRUS_WATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the stats host.
    pub stats_url: String,
    /// Base URL of the network host.
    pub network_url: String,
    /// UI tick: how long to wait for input before redrawing, in milliseconds.
    pub tick_ms: u64,
    /// Where to write logs. The terminal belongs to the UI, so without this
    /// nothing is logged.
    pub log_file: Option<PathBuf>,
    /// Replay saved responses from this directory instead of the live API.
    pub replay_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stats_url: DEFAULT_STATS_URL.to_string(),
            network_url: DEFAULT_NETWORK_URL.to_string(),
            tick_ms: 100,
            log_file: None,
            replay_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }
}
