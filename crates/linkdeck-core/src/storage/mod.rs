//! Storage layer
//!
//! The store persists its full snapshot after every successful mutation
//! through the [`SnapshotPersistence`] port. The production backend writes a
//! single JSON document; the in-memory backend backs tests.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{JsonFilePersistence, MemoryPersistence, SnapshotPersistence};
