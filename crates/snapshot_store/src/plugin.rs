//! Host document-store persistence plugin contract.

use std::{future::Future, pin::Pin};

use crate::SnapshotError;

/// Object-safe boxed future used by [`PersistencePlugin`] async methods.
pub type PersistenceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Persistence plugin invoked by the host document store.
///
/// Error policy differs between the two operations: `load` never fails (every failure is
/// reported as "no snapshot"), while `save` reports open and write failures to the caller since
/// a failed save can lose data.
pub trait PersistencePlugin<T> {
    /// Plugin identifier.
    fn name(&self) -> &str;

    /// Loads the previously saved document collection, or `None` when there is none, the
    /// storage facility is unavailable, or the stored snapshot cannot be read.
    fn load(&self) -> PersistenceFuture<'_, Option<Vec<T>>>;

    /// Persists the non-`None` documents of `data`, replacing any previous snapshot.
    fn save<'a>(&'a self, data: &'a [Option<T>]) -> PersistenceFuture<'a, Result<(), SnapshotError>>;
}
