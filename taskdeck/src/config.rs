//! Configuration management for taskdeck.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A variable that is unset or does not parse falls back to its default.

use crate::persistence::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the snapshot file (`TASKDECK_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Key the snapshot is stored under (`TASKDECK_STORAGE_KEY`)
    pub storage_key: String,
    /// How long a toast stays up, in milliseconds (`TASKDECK_TOAST_DURATION_MS`)
    pub toast_duration_ms: u64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Graceful shutdown timeout in seconds (`TASKDECK_SHUTDOWN_TIMEOUT`)
    pub shutdown_timeout: u64,
}

impl Config {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("TASKDECK_DATA_DIR")
                .filter(|s| !s.trim().is_empty())
                .map_or(defaults.data_dir, PathBuf::from),
            storage_key: lookup("TASKDECK_STORAGE_KEY")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.storage_key),
            toast_duration_ms: lookup("TASKDECK_TOAST_DURATION_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.toast_duration_ms),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            shutdown_timeout: lookup("TASKDECK_SHUTDOWN_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.shutdown_timeout),
        }
    }

    /// Toast lifetime as a `Duration`
    #[must_use]
    pub const fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// Shutdown timeout as a `Duration`
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".taskdeck"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            toast_duration_ms: 3000,
            log_level: "info".to_string(),
            shutdown_timeout: 5,
        }
    }
}
