//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration.

use std::path::PathBuf;

use causerie_shared::constants::{
    DEFAULT_MAX_PARTICIPANTS, DEFAULT_POLL_INTERVAL_MS, GROUP_MIN_PARTICIPANTS,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum number of participants in a group conversation.
    /// Env: `CAUSERIE_MAX_GROUP_SIZE`
    /// Default: `10`.  Values below the group minimum are raised to it.
    pub max_group_size: usize,

    /// Interval of the history poll, in milliseconds.
    /// Env: `CAUSERIE_POLL_INTERVAL_MS`
    /// Default: `1000`
    pub poll_interval_ms: u64,

    /// Explicit database file path.
    /// Env: `CAUSERIE_DB_PATH`
    /// Default: none (platform data directory).
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_group_size: DEFAULT_MAX_PARTICIPANTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            db_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("CAUSERIE_MAX_GROUP_SIZE") {
            match size.parse::<usize>() {
                Ok(parsed) => config.max_group_size = parsed,
                Err(_) => {
                    tracing::warn!(
                        value = %size,
                        "Invalid CAUSERIE_MAX_GROUP_SIZE, using default"
                    );
                }
            }
        }

        if let Ok(interval) = std::env::var("CAUSERIE_POLL_INTERVAL_MS") {
            match interval.parse::<u64>() {
                Ok(parsed) => config.poll_interval_ms = parsed,
                Err(_) => {
                    tracing::warn!(
                        value = %interval,
                        "Invalid CAUSERIE_POLL_INTERVAL_MS, using default"
                    );
                }
            }
        }

        if let Ok(path) = std::env::var("CAUSERIE_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        config
    }

    /// The group-size cap actually enforced.  A configured maximum below the
    /// group minimum would make every group invalid, so it is raised to the
    /// minimum.
    pub fn effective_max_group_size(&self) -> usize {
        self.max_group_size.max(GROUP_MIN_PARTICIPANTS)
    }
}
