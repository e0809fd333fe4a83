//! Errors from reading and writing the stored snapshot

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The snapshot file exists but could not be read
    #[error("Cannot read snapshot '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating the data directory, the temp file or the final rename failed
    #[error("Cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stored snapshot could not be parsed; the original bytes were kept aside
    #[error("Snapshot at '{path}' is not valid JSON ({details}); original kept at '{backup_path}'")]
    CorruptDocument {
        path: PathBuf,
        backup_path: PathBuf,
        details: String,
    },

    #[error("Cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// Backend refused the write (in-memory backends, quotas)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }

    /// What the user can do so the next change is saved
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            StorageError::Read { source, .. } | StorageError::Write { source, .. } => {
                io_hint(source)
            }
            StorageError::CorruptDocument { .. } => {
                Some("Restore a bundle with `linkdeck backup restore <file>` or keep working from an empty store.")
            }
            StorageError::Unavailable(_) => {
                Some("Free some storage space; the next change rewrites the whole snapshot.")
            }
            StorageError::Encode(_) => None,
        }
    }
}

fn io_hint(error: &io::Error) -> Option<&'static str> {
    if error.kind() == io::ErrorKind::PermissionDenied {
        Some("Make the data directory writable or point `data_dir` somewhere writable.")
    } else if is_out_of_space(error) {
        Some("Free some disk space; the next change rewrites the whole snapshot.")
    } else {
        None
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left") || msg.contains("quota exceeded") || msg.contains("disk full")
}

pub type StorageResult<T> = Result<T, StorageError>;
