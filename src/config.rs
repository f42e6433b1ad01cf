//! Configuration for the access-control core

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Session time-to-live applied when `HRDESK_SESSION_TTL` is not set
const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Runtime configuration: session TTL, countdown cadence, channel sizing
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Directory for client-local state (holds the persisted session marker)
    pub state_dir: PathBuf,

    /// Seconds a session lives before forced logout, absent a renewal
    pub session_ttl_secs: u64,

    /// Seconds between countdown ticks
    pub tick_interval_secs: u64,

    /// Capacity of the session command channel
    pub command_capacity: usize,

    /// Capacity of the session event broadcast channel
    pub event_capacity: usize,
}

impl AccessConfig {
    /// Create a configuration with default settings.
    ///
    /// The session TTL can be overridden through the `HRDESK_SESSION_TTL`
    /// environment variable (whole seconds).
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
            session_ttl_secs: std::env::var("HRDESK_SESSION_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            tick_interval_secs: 1,
            command_capacity: 64,
            event_capacity: 16,
        }
    }

    /// Set the session TTL in seconds
    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    /// Set the countdown cadence in seconds
    pub fn with_tick_interval_secs(mut self, secs: u64) -> Self {
        self.tick_interval_secs = secs;
        self
    }

    /// Path of the persisted session marker file
    pub fn marker_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    /// Countdown cadence as a `Duration` (never zero)
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}
