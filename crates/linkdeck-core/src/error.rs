//! Store errors
//!
//! Every variant is recoverable: a rejected operation leaves the previous
//! snapshot in place.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed input (empty title, unknown category, duplicate id)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced link or category does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operation would break a structural rule (e.g. deleting a reserved category)
    #[error("Operation not allowed: {0}")]
    InvalidOperation(String),
}

impl StoreError {
    pub(crate) fn link_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "Link",
            id: id.to_string(),
        }
    }

    pub(crate) fn category_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "Category",
            id: id.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, StoreError::InvalidOperation(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
