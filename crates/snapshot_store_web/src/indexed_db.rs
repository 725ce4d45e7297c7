//! IndexedDB-backed [`SnapshotBackend`] implementation.

use snapshot_store::{
    BackendFuture, OpenRequest, SnapshotBackend, SnapshotConnection, SnapshotError,
    SnapshotRecord, SnapshotStore, SnapshotStoreConfig,
};

use crate::bridge::{self, DbHandle, IdbFactory};

/// Global names under which browsers have exposed the IndexedDB factory, in probe order.
pub const INDEXED_DB_GLOBALS: [&str; 4] =
    ["indexedDB", "mozIndexedDB", "webkitIndexedDB", "msIndexedDB"];

/// Snapshot store persisting into the browser's IndexedDB.
pub type WebSnapshotStore = SnapshotStore<IndexedDbBackend>;

#[derive(Debug, Clone, Default)]
/// Browser storage backend using the first IndexedDB factory found on the global object.
pub struct IndexedDbBackend {
    factory: Option<IdbFactory>,
}

impl IndexedDbBackend {
    /// Probes the current execution context for an IndexedDB factory.
    pub fn detect() -> Self {
        Self {
            factory: bridge::probe_factory(),
        }
    }

    /// Backend with no factory; every store built on it is disabled.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl SnapshotBackend for IndexedDbBackend {
    type Connection = IndexedDbConnection;

    fn is_available(&self) -> bool {
        self.factory.is_some()
    }

    fn open(
        &self,
        request: &OpenRequest,
    ) -> BackendFuture<'static, Result<Self::Connection, SnapshotError>> {
        let factory = self.factory.clone();
        let request = request.clone();
        Box::pin(async move {
            let factory = factory.ok_or(SnapshotError::Unsupported)?;
            let handle = bridge::open_database(&factory, &request).await?;
            Ok(IndexedDbConnection { handle })
        })
    }
}

#[derive(Debug)]
/// Open IndexedDB database handle. Never closed explicitly.
pub struct IndexedDbConnection {
    handle: DbHandle,
}

impl SnapshotConnection for IndexedDbConnection {
    fn get_record<'a>(
        &'a self,
        store_name: &'a str,
        key: &'a str,
    ) -> BackendFuture<'a, Result<Option<SnapshotRecord>, SnapshotError>> {
        Box::pin(bridge::get_record(&self.handle, store_name, key))
    }

    fn put_record<'a>(
        &'a self,
        store_name: &'a str,
        record: &'a SnapshotRecord,
    ) -> BackendFuture<'a, Result<(), SnapshotError>> {
        Box::pin(bridge::put_record(&self.handle, store_name, record))
    }
}

/// Builds a snapshot store over the detected IndexedDB factory.
pub fn web_snapshot_store(config: SnapshotStoreConfig) -> WebSnapshotStore {
    SnapshotStore::new(IndexedDbBackend::detect(), config)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::{json, Value};
    use snapshot_store::{ConnectionState, PersistencePlugin};

    use super::*;

    #[test]
    fn probe_order_prefers_standard_name() {
        assert_eq!(INDEXED_DB_GLOBALS[0], "indexedDB");
        assert_eq!(INDEXED_DB_GLOBALS.len(), 4);
    }

    #[test]
    fn unavailable_backend_fails_open_without_engine() {
        let backend = IndexedDbBackend::unavailable();
        assert!(!backend.is_available());
        assert_eq!(
            block_on(backend.open(&OpenRequest::snapshot("db"))).map(|_| ()),
            Err(SnapshotError::Unsupported)
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_store_is_disabled_and_inert() {
        let store = web_snapshot_store(SnapshotStoreConfig::default());

        assert!(!store.is_enabled());
        assert_eq!(store.connection_state(), ConnectionState::Disabled);
        assert_eq!(PersistencePlugin::<Value>::name(&store), "IndexedDBPersistence");
        block_on(store.save(&[Some(json!({"id": 1})), None])).expect("save is a no-op");
        assert_eq!(block_on(store.load::<Value>()), None);
    }
}
