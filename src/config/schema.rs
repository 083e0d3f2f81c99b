//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::facade::EnvironmentRecord;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ToolConfig {
    /// Environment the model is bound to.
    pub environment: EnvironmentRecord,

    /// Refresh behaviour.
    pub refresh: RefreshConfig,

    /// Snapshot source for the file-backed facade.
    pub snapshot: SnapshotConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Deadline for each control-plane call in seconds (0 = none).
    pub fetch_timeout_secs: u64,

    /// Capacity of the model-wide change bus.
    pub change_buffer: usize,
}

impl RefreshConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            change_buffer: 256,
        }
    }
}

/// Snapshot file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Path to the snapshot (TOML or JSON).
    pub path: Option<PathBuf>,

    /// Reload the snapshot and refresh whenever the file changes.
    pub watch: bool,

    /// Poll interval of the file watcher in seconds.
    pub poll_interval_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: None,
            watch: false,
            poll_interval_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
