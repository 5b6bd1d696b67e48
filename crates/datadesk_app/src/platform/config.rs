//! RON configuration for the terminal front end.
//!
//! Every field is optional in the file; missing fields take the engine
//! defaults. Durations are whole milliseconds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use datadesk_engine::{ClientSettings, TrackerSettings};
use datadesk_logging::desk_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "datadesk.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub research_poll_ms: u64,
    pub pdf_poll_ms: u64,
    pub status_timeout_ms: u64,
    pub failure_reset_ms: u64,
    /// Where the job history and log file live.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let tracker = TrackerSettings::default();
        Self {
            server: client.base_url,
            connect_timeout_ms: millis(client.connect_timeout),
            request_timeout_ms: millis(client.request_timeout),
            research_poll_ms: millis(tracker.research_poll_interval),
            pdf_poll_ms: millis(tracker.pdf_poll_interval),
            status_timeout_ms: millis(tracker.status_timeout),
            failure_reset_ms: millis(tracker.failure_reset_delay),
            data_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Loads `explicit` if given, otherwise `datadesk.ron` in the working
    /// directory. Only an explicitly named file has to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        desk_info!("loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        ron::from_str(text).map_err(|err| err.to_string())
    }

    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server.filter(|server| !server.trim().is_empty()) {
            self.server = server;
        }
        self
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.server.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            research_poll_interval: Duration::from_millis(self.research_poll_ms),
            pdf_poll_interval: Duration::from_millis(self.pdf_poll_ms),
            status_timeout: Duration::from_millis(self.status_timeout_ms),
            failure_reset_delay: Duration::from_millis(self.failure_reset_ms),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
