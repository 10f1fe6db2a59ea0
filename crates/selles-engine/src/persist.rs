//! # Snapshot Persistence
//!
//! The whole [`AppState`] is persisted as a single JSON document,
//! rewritten after every mutating operation. There is no incremental
//! log and no migration story: the snapshot either parses as the
//! current shape or loading fails loudly.
//!
//! ## Why
//! The dataset is one store's catalog, staff list and sale history -
//! small enough that whole-document writes stay cheap, and a single
//! document makes the on-disk state trivially inspectable.
//!
//! Writes go through a temp file in the same directory followed by a
//! rename, so a crash mid-write leaves the previous snapshot intact
//! rather than a truncated file.
//!
//! Background saves may be scheduled faster than the disk keeps up and
//! can reach the blocking pool out of order. A writer lock serializes
//! the temp-file dance, and [`SnapshotStore::save_if_newer`] tags each
//! save with a version: a save that arrives after a newer one has
//! already been written is skipped, so the file on disk never rolls
//! back to an older state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info};

use crate::state::AppState;

/// Errors from loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem failure while reading or writing the snapshot.
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot file exists but is not valid state JSON. This is
    /// never silently replaced with seed data; a corrupt file needs a
    /// human decision.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Reads and writes the state snapshot at a fixed path.
///
/// Clones share the writer lock, so every handle to the same path
/// serializes through the same temp file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    /// Version of the newest snapshot written so far.
    last_written: Arc<Mutex<u64>>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore {
            path: path.into(),
            last_written: Arc::new(Mutex::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, or returns seed data when none exists yet.
    ///
    /// A missing file is the normal first-launch case. A present but
    /// unparseable file is an error.
    pub fn load(&self) -> Result<AppState, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let state: AppState = serde_json::from_str(&raw)?;
                info!(
                    path = %self.path.display(),
                    products = state.products.len(),
                    sales = state.sales.len(),
                    "Snapshot loaded"
                );
                Ok(state)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No snapshot found, seeding initial state");
                Ok(AppState::seed())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the full snapshot, atomically replacing any previous one.
    pub fn save(&self, state: &AppState) -> Result<(), PersistError> {
        let mut last = self.last_written.lock().expect("snapshot writer poisoned");
        self.write_snapshot(state)?;
        *last += 1;
        Ok(())
    }

    /// Writes the snapshot only if `version` is newer than everything
    /// written so far. Skipped saves are not errors: a newer snapshot
    /// is already on disk.
    ///
    /// The caller must hand out versions in the same order the
    /// snapshots were taken; the engine assigns them under its state
    /// lock.
    pub fn save_if_newer(&self, state: &AppState, version: u64) -> Result<(), PersistError> {
        let mut last = self.last_written.lock().expect("snapshot writer poisoned");
        if version <= *last {
            debug!(version, newest = *last, "Skipping stale snapshot save");
            return Ok(());
        }
        self.write_snapshot(state)?;
        *last = version;
        Ok(())
    }

    fn write_snapshot(&self, state: &AppState) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;

        // Temp file next to the target so the rename stays on one
        // filesystem.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "Snapshot saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
