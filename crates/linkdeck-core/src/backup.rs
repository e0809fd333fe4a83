//! Backup bundles
//!
//! A bundle is the whole `(links, categories)` snapshot plus a version stamp,
//! an export timestamp, and optional settings sections that are carried
//! through untouched. Restore accepts full bundles as well as bare
//! `{links, categories}` documents.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{Category, LinkItem, Snapshot};
use crate::remote::RemoteConfig;
use crate::storage::persistence::atomic_write;
use crate::storage::StorageError;
use crate::store::BookmarkStore;

/// Version written into new bundles
pub const BUNDLE_VERSION: &str = "1.0";

/// Errors reading, writing or applying a backup
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to read backup file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid backup document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Backup rejected: {0}")]
    Rejected(#[from] StoreError),
}

pub type BackupResult<T> = Result<T, BackupError>;

/// Exported snapshot with metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupBundle {
    #[serde(default = "default_version")]
    pub version: String,

    /// Absent on bare `{links, categories}` documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,

    pub links: Vec<LinkItem>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webdav_config: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_config: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_config: Option<serde_json::Value>,
}

/// How a restored bundle meets the existing data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreMode {
    /// Replace the whole snapshot
    #[default]
    Replace,
    /// Add what is new, keep what exists
    Merge,
}

impl BackupBundle {
    /// Bundle the given snapshot, stamped now
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            version: default_version(),
            exported_at: Some(Utc::now()),
            links: snapshot.links.clone(),
            categories: snapshot.categories.clone(),
            webdav_config: None,
            ai_config: None,
            search_config: None,
        }
    }

    /// Include remote settings in the bundle
    pub fn with_remote_config(mut self, remote: &RemoteConfig) -> BackupResult<Self> {
        self.webdav_config = Some(serde_json::to_value(remote)?);
        Ok(self)
    }

    /// Remote settings carried by the bundle, if any are readable
    pub fn remote_config(&self) -> Option<RemoteConfig> {
        self.webdav_config
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Parse a bundle or a bare `{links, categories}` document
    pub fn parse(text: &str) -> BackupResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> BackupResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_file(path: &Path) -> BackupResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| BackupError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::parse(&text)?;
        debug!(
            "Read backup {:?}: {} links, {} categories",
            path,
            bundle.links.len(),
            bundle.categories.len()
        );
        Ok(bundle)
    }

    /// Write the bundle atomically
    pub fn write_file(&self, path: &Path) -> BackupResult<()> {
        atomic_write(path, self.to_json()?.as_bytes())?;
        info!("Wrote backup with {} links to {:?}", self.links.len(), path);
        Ok(())
    }

    /// Apply the bundle to the store
    ///
    /// Returns the number of links now contributed by the bundle: every link
    /// for `Replace`, only the newly added ones for `Merge`.
    pub fn restore_into(self, store: &mut BookmarkStore, mode: RestoreMode) -> BackupResult<usize> {
        let restored = match mode {
            RestoreMode::Replace => {
                let count = self.links.len();
                store.update_data(self.links, self.categories)?;
                count
            }
            RestoreMode::Merge => store.import_data(self.links, self.categories)?,
        };
        info!("Restored backup ({:?}): {} links", mode, restored);
        Ok(restored)
    }
}

fn default_version() -> String {
    BUNDLE_VERSION.to_string()
}
