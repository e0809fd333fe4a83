//! LinkDeck Core Library
//!
//! This crate provides the core functionality for LinkDeck, an ordered
//! bookmark store: links grouped into categories, a pinned section, and
//! drag-style manual ordering that survives restarts.
//!
//! # Architecture
//!
//! - **Snapshot**: the `(links, categories)` pair is the unit of state. It is
//!   replaced, never patched, on every mutation.
//! - **Store**: validates a mutation, builds the next snapshot, persists it
//!   through a [`storage::SnapshotPersistence`] backend and publishes it on a
//!   watch channel.
//! - **Views**: every front end reads ordering through [`view`], so the same
//!   data always displays in the same order.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = BookmarkStore::open(&config);
//!
//! let link = store.add_link(LinkDraft::new("Rust", "https://rust-lang.org", "common"))?;
//! store.toggle_pin(&link.id)?;
//!
//! for link in view::pinned_links(&store.snapshot()) {
//!     println!("{}", link.title);
//! }
//! ```
//!
//! # Modules
//!
//! - `store`: the bookmark store (main entry point)
//! - `models`: links, categories and snapshots
//! - `ordering`: display and pinned ordering, drag-and-drop moves
//! - `view`: filtered, ordered read models
//! - `storage`: snapshot persistence backends
//! - `backup`: backup bundle export and restore
//! - `import`: browser bookmark import
//! - `remote`: WebDAV backup push/pull
//! - `config`: application configuration

pub mod backup;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod ordering;
pub mod remote;
pub mod storage;
pub mod store;
pub mod view;

pub use backup::{BackupBundle, BackupError, RestoreMode};
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use import::{BookmarkCandidate, ImportDocument, ImportPlan, ImportTarget};
pub use models::{
    Category, LinkDraft, LinkItem, LinkUpdate, Snapshot, ALL_CATEGORY_ID, COMMON_CATEGORY_ID,
};
pub use remote::{RemoteConfig, RemoteError, WebDavClient};
pub use storage::{JsonFilePersistence, MemoryPersistence, SnapshotPersistence, StorageError};
pub use store::{BookmarkStore, PersistenceHealth};
pub use view::{CategoryScope, ViewFilter};
