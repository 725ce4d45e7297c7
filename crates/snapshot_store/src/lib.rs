//! Snapshot persistence for a host document store.
//!
//! The host calls [`PersistencePlugin::load`] once at startup and [`PersistencePlugin::save`]
//! whenever it wants the full document collection persisted. [`SnapshotStore`] implements that
//! contract by writing the whole collection as one JSON string under a fixed key in a single
//! object store, through any [`SnapshotBackend`]. The browser IndexedDB backend lives in
//! `snapshot_store_web`; [`MemorySnapshotBackend`] covers tests and non-browser hosts.
//!
//! # Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use snapshot_store::{MemorySnapshotBackend, SnapshotStore};
//!
//! let store = SnapshotStore::with_backend(MemorySnapshotBackend::default());
//! block_on(store.save(&[Some(1_u32), None, Some(2)])).expect("save");
//! assert_eq!(block_on(store.load::<u32>()), Some(vec![1, 2]));
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod backend;
pub mod config;
pub mod error;
pub mod plugin;
pub mod record;
pub mod store;

pub use backend::memory::{MemoryConnection, MemorySnapshotBackend};
pub use backend::{BackendFuture, SnapshotBackend, SnapshotConnection};
pub use config::SnapshotStoreConfig;
pub use error::SnapshotError;
pub use plugin::{PersistenceFuture, PersistencePlugin};
pub use record::{
    OpenRequest, SnapshotRecord, DEFAULT_DATABASE_NAME, PLUGIN_NAME, SCHEMA_VERSION,
    SNAPSHOT_KEY_PATH, SNAPSHOT_RECORD_KEY, SNAPSHOT_STORE_NAME,
};
pub use store::{ConnectionState, SnapshotStore};
