//! Session bookkeeping configuration.

use serde::{Deserialize, Serialize};

/// Session maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Whether the periodic cleanup task runs at all.
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
    /// Interval for the expired/revoked token purge sweep, in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cleanup_enabled: true,
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}
