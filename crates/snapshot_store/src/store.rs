//! Capability-gated snapshot adapter over a [`SnapshotBackend`].

use std::{cell::RefCell, fmt, rc::Rc};

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use leptos::logging;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    backend::{SnapshotBackend, SnapshotConnection},
    OpenRequest, PersistenceFuture, PersistencePlugin, SnapshotError, SnapshotRecord,
    SnapshotStoreConfig, PLUGIN_NAME, SNAPSHOT_RECORD_KEY, SNAPSHOT_STORE_NAME,
};

type PendingConnection<C> = Shared<LocalBoxFuture<'static, Result<Rc<C>, SnapshotError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Observable connection lifecycle of a [`SnapshotStore`].
pub enum ConnectionState {
    /// The storage facility is absent; no connection is ever attempted.
    Disabled,
    /// No open has been issued yet, or the last one failed.
    NoConnection,
    /// An open request is in flight.
    Connecting,
    /// The database handle is cached.
    Connected,
}

/// Persists a whole document collection as one record in one object store.
///
/// Availability of the storage facility is decided once in [`SnapshotStore::new`]. The database
/// is opened lazily on the first `load`/`save`; concurrent first callers share one open request
/// and every later call reuses the cached handle. A failed open is not cached, so the next call
/// tries again.
pub struct SnapshotStore<B: SnapshotBackend> {
    backend: B,
    config: SnapshotStoreConfig,
    enabled: bool,
    connection: RefCell<Option<PendingConnection<B::Connection>>>,
}

impl<B: SnapshotBackend> fmt::Debug for SnapshotStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("config", &self.config)
            .field("enabled", &self.enabled)
            .field("connection", &self.connection_state())
            .finish_non_exhaustive()
    }
}

impl<B: SnapshotBackend> SnapshotStore<B> {
    /// Creates a store over `backend`, probing the storage facility once.
    ///
    /// Never fails: without the facility the store is permanently disabled, `load` returns
    /// `None` and `save` succeeds without doing anything.
    pub fn new(backend: B, config: SnapshotStoreConfig) -> Self {
        let enabled = backend.is_available();
        if !enabled {
            logging::warn!(
                "[snapshot store] IndexedDB is not available in this environment. Persistence is disabled."
            );
        }
        Self {
            backend,
            config,
            enabled,
            connection: RefCell::new(None),
        }
    }

    /// Creates a store over `backend` using the default database name.
    pub fn with_backend(backend: B) -> Self {
        Self::new(backend, SnapshotStoreConfig::default())
    }

    /// Whether persistence is attempted at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Active configuration.
    pub fn config(&self) -> &SnapshotStoreConfig {
        &self.config
    }

    /// Underlying storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current connection lifecycle state.
    pub fn connection_state(&self) -> ConnectionState {
        if !self.enabled {
            return ConnectionState::Disabled;
        }
        match self.connection.borrow().as_ref().map(Shared::peek) {
            None | Some(Some(Err(_))) => ConnectionState::NoConnection,
            Some(None) => ConnectionState::Connecting,
            Some(Some(Ok(_))) => ConnectionState::Connected,
        }
    }

    /// Loads the stored document collection.
    ///
    /// Returns `None` when the store is disabled, no snapshot exists, or any step fails. Failures
    /// are logged, never returned.
    pub async fn load<T: DeserializeOwned>(&self) -> Option<Vec<T>> {
        if !self.enabled {
            return None;
        }
        match self.try_load().await {
            Ok(documents) => documents,
            Err(err) => {
                logging::error!("[snapshot store] load failed: {err}");
                None
            }
        }
    }

    /// Loads the stored document collection, surfacing failures.
    ///
    /// `Ok(None)` means no snapshot (no record, or a record without payload).
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Unsupported`] when disabled, [`SnapshotError::Open`] or
    /// [`SnapshotError::Read`] for engine failures, and [`SnapshotError::Corrupt`] when the stored
    /// payload is not a document array.
    pub async fn try_load<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>, SnapshotError> {
        let connection = self.connect().await?;
        let record = connection
            .get_record(SNAPSHOT_STORE_NAME, SNAPSHOT_RECORD_KEY)
            .await?;
        let Some(payload) = record.as_ref().and_then(SnapshotRecord::payload) else {
            return Ok(None);
        };
        serde_json::from_str(payload)
            .map(Some)
            .map_err(|e| SnapshotError::Corrupt(e.to_string()))
    }

    /// Replaces the stored snapshot with the non-`None` entries of `items`.
    ///
    /// A no-op when the store is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Open`] when the database cannot be opened,
    /// [`SnapshotError::Serialize`] when a document cannot be encoded, and
    /// [`SnapshotError::Write`] when the write transaction fails.
    pub async fn save<T: Serialize>(&self, items: &[Option<T>]) -> Result<(), SnapshotError> {
        if !self.enabled {
            return Ok(());
        }
        let connection = self.connect().await?;
        let documents = items.iter().flatten().collect::<Vec<&T>>();
        let data =
            serde_json::to_string(&documents).map_err(|e| SnapshotError::Serialize(e.to_string()))?;
        connection
            .put_record(SNAPSHOT_STORE_NAME, &SnapshotRecord::snapshot(data))
            .await
    }

    async fn connect(&self) -> Result<Rc<B::Connection>, SnapshotError> {
        if !self.enabled {
            return Err(SnapshotError::Unsupported);
        }
        let pending = self.pending_connection();
        let result = pending.clone().await;
        if result.is_err() {
            let mut slot = self.connection.borrow_mut();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
                *slot = None;
            }
        }
        result
    }

    fn pending_connection(&self) -> PendingConnection<B::Connection> {
        let mut slot = self.connection.borrow_mut();
        if let Some(pending) = slot.as_ref() {
            if !matches!(pending.peek(), Some(Err(_))) {
                return pending.clone();
            }
        }
        let request = OpenRequest::snapshot(self.config.database_name.clone());
        let pending = self
            .backend
            .open(&request)
            .map(|result| result.map(Rc::new))
            .boxed_local()
            .shared();
        *slot = Some(pending.clone());
        pending
    }
}

impl<B, T> PersistencePlugin<T> for SnapshotStore<B>
where
    B: SnapshotBackend,
    T: Serialize + DeserializeOwned + 'static,
{
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn load(&self) -> PersistenceFuture<'_, Option<Vec<T>>> {
        Box::pin(Self::load::<T>(self))
    }

    fn save<'a>(&'a self, data: &'a [Option<T>]) -> PersistenceFuture<'a, Result<(), SnapshotError>> {
        Box::pin(Self::save(self, data))
    }
}
