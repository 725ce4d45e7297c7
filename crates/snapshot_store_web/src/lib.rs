//! Browser (`wasm32`) IndexedDB backend for [`snapshot_store`].
//!
//! [`web_snapshot_store`] probes the global object for an IndexedDB factory and returns a
//! [`snapshot_store::SnapshotStore`] that persists the host's document collection into it. Outside
//! `wasm32` no factory is ever found and the returned store is permanently disabled.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod bridge;
pub mod indexed_db;

pub use indexed_db::{
    web_snapshot_store, IndexedDbBackend, IndexedDbConnection, WebSnapshotStore,
    INDEXED_DB_GLOBALS,
};
