//! Storage engine contracts consumed by [`crate::SnapshotStore`].
//!
//! A backend answers one question synchronously (is the facility reachable at all?) and opens
//! connections asynchronously. Connections expose exactly the two record operations the snapshot
//! adapter needs: keyed read and keyed upsert.

pub mod memory;

use std::{future::Future, pin::Pin};

use crate::{OpenRequest, SnapshotError, SnapshotRecord};

/// Object-safe boxed future used by backend and connection methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Local structured-storage facility able to open snapshot databases.
pub trait SnapshotBackend {
    /// Open database handle.
    type Connection: SnapshotConnection + 'static;

    /// Reports whether the facility exists in the current execution context.
    fn is_available(&self) -> bool;

    /// Opens `request.database_name`, creating `request.store_name` on the upgrade path.
    ///
    /// The returned future owns everything it needs so it can be shared between callers.
    fn open(
        &self,
        request: &OpenRequest,
    ) -> BackendFuture<'static, Result<Self::Connection, SnapshotError>>;
}

/// Open database connection.
pub trait SnapshotConnection {
    /// Reads the record stored at `key` in a read-only transaction.
    fn get_record<'a>(
        &'a self,
        store_name: &'a str,
        key: &'a str,
    ) -> BackendFuture<'a, Result<Option<SnapshotRecord>, SnapshotError>>;

    /// Inserts or replaces `record` in a read-write transaction.
    fn put_record<'a>(
        &'a self,
        store_name: &'a str,
        record: &'a SnapshotRecord,
    ) -> BackendFuture<'a, Result<(), SnapshotError>>;
}
