//! Snapshot persistence
//!
//! The store talks to storage through [`SnapshotPersistence`]. Two backends:
//!
//! - [`JsonFilePersistence`]: one JSON document under a fixed key inside the
//!   data directory, written atomically (temp file, then rename).
//! - [`MemoryPersistence`]: in-memory, for tests and embedding.
//!
//! Storage location: `~/.local/share/linkdeck/linkdeck_data_cache.json`
//! (configurable via `Config`)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;
use crate::models::Snapshot;

/// Port between the store and wherever snapshots live
pub trait SnapshotPersistence {
    /// Read the stored snapshot
    ///
    /// `Ok(None)` when nothing has been stored yet. A stored but unreadable
    /// snapshot is reported as [`StorageError::CorruptDocument`].
    fn load(&self) -> StorageResult<Option<Snapshot>>;

    /// Overwrite the stored snapshot
    fn save(&mut self, snapshot: &Snapshot) -> StorageResult<()>;

    /// Human-readable location, for status output
    fn describe(&self) -> String;
}

/// Snapshot stored as a JSON file
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Persist to the configured store path
    pub fn new(config: &Config) -> Self {
        Self::at_path(config.store_path())
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a snapshot exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Size of the stored file in bytes (0 when absent)
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Where an unreadable snapshot is copied before falling back
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt.backup");
        PathBuf::from(name)
    }
}

impl SnapshotPersistence for JsonFilePersistence {
    fn load(&self) -> StorageResult<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snapshot) => {
                debug!(
                    "Loaded snapshot from {:?}: {} links, {} categories",
                    self.path,
                    snapshot.links.len(),
                    snapshot.categories.len()
                );
                Ok(Some(snapshot))
            }
            Err(e) => {
                let backup_path = self.corrupt_backup_path();
                if let Err(copy_err) = fs::copy(&self.path, &backup_path) {
                    warn!(
                        "Could not back up corrupt snapshot to {:?}: {}",
                        backup_path, copy_err
                    );
                }
                Err(StorageError::CorruptDocument {
                    path: self.path.clone(),
                    backup_path,
                    details: e.to_string(),
                })
            }
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        atomic_write(&self.path, &bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory snapshot storage
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Default)]
struct MemorySlot {
    snapshot: Option<Snapshot>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let persistence = Self::default();
        persistence.lock().snapshot = Some(snapshot);
        persistence
    }

    /// Make subsequent writes fail (simulates an exhausted quota)
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Last snapshot successfully written
    pub fn stored(&self) -> Option<Snapshot> {
        self.lock().snapshot.clone()
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotPersistence for MemoryPersistence {
    fn load(&self) -> StorageResult<Option<Snapshot>> {
        Ok(self.lock().snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> StorageResult<()> {
        let mut slot = self.lock();
        if slot.fail_writes {
            return Err(StorageError::Unavailable("storage quota exceeded".to_string()));
        }
        slot.snapshot = Some(snapshot.clone());
        slot.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StorageError::write(parent, e))?;
        }
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::write(&temp_path, e))?;
    file.write_all(data)
        .map_err(|e| StorageError::write(&temp_path, e))?;
    file.sync_all()
        .map_err(|e| StorageError::write(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::write(path, e))?;

    Ok(())
}
