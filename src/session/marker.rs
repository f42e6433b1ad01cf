//! Persisted session marker
//!
//! A tiny record surviving process restarts so a fresh start can resume a
//! session mid-countdown instead of forcing a new login. The marker stores
//! the session start instant, never a live countdown; remaining time is
//! recomputed from the wall clock at restore.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};

/// What a session leaves behind between process runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub actor_id: String,
    /// When the session (or its latest renewal) started
    pub started_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl SessionMarker {
    /// A marker starting now. Login and renewal both write one of these.
    pub fn begin(actor_id: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            actor_id: actor_id.into(),
            started_at: Utc::now(),
            ttl_secs,
        }
    }

    /// Wall-clock seconds left as of `now`, zero once the TTL has elapsed
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;
        self.ttl_secs.saturating_sub(elapsed)
    }
}

/// Where the marker lives between runs.
///
/// Single-slot storage: at most one session marker exists, and the latest
/// write wins.
pub trait MarkerStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionMarker>>;

    fn save(&self, marker: &SessionMarker) -> Result<()>;

    /// Remove the marker; removing an absent marker is not an error
    fn clear(&self) -> Result<()>;
}

/// Marker persisted as a JSON file
pub struct JsonMarkerFile {
    path: PathBuf,
}

impl JsonMarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarkerStore for JsonMarkerFile {
    fn load(&self) -> Result<Option<SessionMarker>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, marker: &SessionMarker) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(marker)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Marker held in memory; clones share one slot. Handy in tests, where the
/// test keeps a clone to observe what the session actor persisted.
#[derive(Clone, Default)]
pub struct InMemoryMarkerStore {
    slot: Arc<Mutex<Option<SessionMarker>>>,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for InMemoryMarkerStore {
    fn load(&self) -> Result<Option<SessionMarker>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| AccessError::Persistence("marker slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, marker: &SessionMarker) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AccessError::Persistence("marker slot poisoned".to_string()))?;
        *slot = Some(marker.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AccessError::Persistence("marker slot poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_fresh_marker_has_full_ttl() {
        let marker = SessionMarker::begin("emp-001", 1800);
        assert_eq!(marker.remaining_secs(marker.started_at), 1800);
    }

    #[test]
    fn test_remaining_counts_down_and_clamps() {
        let marker = SessionMarker::begin("emp-001", 300);
        let later = marker.started_at + Duration::seconds(255);
        assert_eq!(marker.remaining_secs(later), 45);

        let long_gone = marker.started_at + Duration::seconds(10_000);
        assert_eq!(marker.remaining_secs(long_gone), 0);
    }

    #[test]
    fn test_clock_skew_does_not_inflate_remaining() {
        let marker = SessionMarker::begin("emp-001", 300);
        let before_start = marker.started_at - Duration::seconds(120);
        assert_eq!(marker.remaining_secs(before_start), 300);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonMarkerFile::new(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());

        let marker = SessionMarker::begin("emp-003", 300);
        store.save(&marker).unwrap();
        assert_eq!(store.load().unwrap(), Some(marker));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_json_file_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = JsonMarkerFile::new(dir.path().join("nested/state/session.json"));
        store.save(&SessionMarker::begin("emp-001", 60)).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = JsonMarkerFile::new(path);
        assert!(matches!(store.load(), Err(AccessError::Serialization(_))));
    }

    #[test]
    fn test_in_memory_clones_share_the_slot() {
        let store = InMemoryMarkerStore::new();
        let view = store.clone();

        store.save(&SessionMarker::begin("emp-002", 120)).unwrap();
        assert_eq!(view.load().unwrap().unwrap().actor_id, "emp-002");

        view.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
