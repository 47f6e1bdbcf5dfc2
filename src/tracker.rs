//! Modification Tracker Module
//!
//! Records, per project key, the last-observed modification time of its
//! source. The table is written on every successful load and consulted to
//! decide whether a cached unit is stale. Records deliberately outlive
//! cache eviction; only an explicit clear drops them.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dashmap::DashMap;

// == Modification Tracker ==
/// Per-key record of the last-observed source modification time.
#[derive(Debug, Default)]
pub struct ModificationTracker {
    records: DashMap<PathBuf, SystemTime>,
}

impl ModificationTracker {
    // == Constructor ==
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Stores the observed modification time for a key, overwriting any
    /// previous record.
    pub fn record(&self, path: &Path, mtime: SystemTime) {
        self.records.insert(path.to_path_buf(), mtime);
    }

    // == Last Modified ==
    /// Returns the recorded modification time for a key, if any.
    pub fn last_modified(&self, path: &Path) -> Option<SystemTime> {
        self.records.get(path).map(|mtime| *mtime)
    }

    // == Is Stale ==
    /// Decides whether a cached value for this key is stale given the
    /// currently observed modification time.
    ///
    /// A key with no record yet is stale: nothing proves the cached value
    /// matches the source on disk.
    pub fn is_stale(&self, path: &Path, current_mtime: SystemTime) -> bool {
        match self.last_modified(path) {
            Some(recorded) => current_mtime > recorded,
            None => true,
        }
    }

    // == Forget ==
    /// Drops the record for one key; returns whether one existed.
    pub fn forget(&self, path: &Path) -> bool {
        self.records.remove(path).is_some()
    }

    // == Clear ==
    /// Drops every record.
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
