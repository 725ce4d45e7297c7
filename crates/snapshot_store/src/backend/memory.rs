//! In-memory backend for tests and hosts without a browser storage facility.

use std::{
    cell::RefCell,
    collections::HashMap,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use super::{BackendFuture, SnapshotBackend, SnapshotConnection};
use crate::{OpenRequest, SnapshotError, SnapshotRecord};

#[derive(Debug, Default)]
struct MemoryDatabase {
    version: u32,
    stores: HashMap<String, HashMap<String, SnapshotRecord>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    databases: HashMap<String, MemoryDatabase>,
    open_count: usize,
    fail_next_open: Option<String>,
    fail_writes: Option<String>,
}

#[derive(Debug, Clone)]
/// Shared in-memory storage engine. Clones observe the same databases.
pub struct MemorySnapshotBackend {
    available: bool,
    state: Rc<RefCell<MemoryState>>,
}

impl Default for MemorySnapshotBackend {
    fn default() -> Self {
        Self {
            available: true,
            state: Rc::new(RefCell::new(MemoryState::default())),
        }
    }
}

impl MemorySnapshotBackend {
    /// Backend that reports the storage facility as absent.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Number of open requests that reached the engine.
    pub fn open_count(&self) -> usize {
        self.state.borrow().open_count
    }

    /// Makes the next open request fail with `error_code`.
    pub fn fail_next_open(&self, error_code: impl Into<String>) {
        self.state.borrow_mut().fail_next_open = Some(error_code.into());
    }

    /// Makes every write fail with `error_code`, or clears the failure with `None`.
    pub fn fail_writes(&self, error_code: Option<String>) {
        self.state.borrow_mut().fail_writes = error_code;
    }

    /// Stores `record` directly, bypassing serialization. Creates the database when missing.
    pub fn insert_raw_record(&self, database_name: &str, store_name: &str, record: SnapshotRecord) {
        let mut state = self.state.borrow_mut();
        let database = state
            .databases
            .entry(database_name.to_string())
            .or_default();
        database.version = database.version.max(crate::SCHEMA_VERSION);
        database
            .stores
            .entry(store_name.to_string())
            .or_default()
            .insert(record.key.clone(), record);
    }

    /// Reads a stored record without going through a connection.
    pub fn record(&self, database_name: &str, store_name: &str, key: &str) -> Option<SnapshotRecord> {
        self.state
            .borrow()
            .databases
            .get(database_name)?
            .stores
            .get(store_name)?
            .get(key)
            .cloned()
    }

    /// Number of records held in `store_name`.
    pub fn record_count(&self, database_name: &str, store_name: &str) -> usize {
        self.state
            .borrow()
            .databases
            .get(database_name)
            .and_then(|database| database.stores.get(store_name))
            .map_or(0, HashMap::len)
    }

    fn open_now(&self, request: &OpenRequest) -> Result<MemoryConnection, SnapshotError> {
        let mut state = self.state.borrow_mut();
        state.open_count += 1;
        if let Some(code) = state.fail_next_open.take() {
            return Err(SnapshotError::Open(code));
        }

        let database = state
            .databases
            .entry(request.database_name.clone())
            .or_default();
        if request.version < database.version {
            return Err(SnapshotError::Open("VersionError".to_string()));
        }
        if request.version > database.version {
            database.version = request.version;
            database.stores.entry(request.store_name.clone()).or_default();
        }

        Ok(MemoryConnection {
            database_name: request.database_name.clone(),
            state: Rc::clone(&self.state),
        })
    }
}

impl SnapshotBackend for MemorySnapshotBackend {
    type Connection = MemoryConnection;

    fn is_available(&self) -> bool {
        self.available
    }

    fn open(
        &self,
        request: &OpenRequest,
    ) -> BackendFuture<'static, Result<Self::Connection, SnapshotError>> {
        let backend = self.clone();
        let request = request.clone();
        Box::pin(async move {
            YieldOnce::default().await;
            backend.open_now(&request)
        })
    }
}

#[derive(Debug)]
/// Connection to one in-memory database.
pub struct MemoryConnection {
    database_name: String,
    state: Rc<RefCell<MemoryState>>,
}

impl SnapshotConnection for MemoryConnection {
    fn get_record<'a>(
        &'a self,
        store_name: &'a str,
        key: &'a str,
    ) -> BackendFuture<'a, Result<Option<SnapshotRecord>, SnapshotError>> {
        Box::pin(async move {
            let state = self.state.borrow();
            let store = state
                .databases
                .get(&self.database_name)
                .and_then(|database| database.stores.get(store_name))
                .ok_or_else(|| SnapshotError::Read("NotFoundError".to_string()))?;
            Ok(store.get(key).cloned())
        })
    }

    fn put_record<'a>(
        &'a self,
        store_name: &'a str,
        record: &'a SnapshotRecord,
    ) -> BackendFuture<'a, Result<(), SnapshotError>> {
        Box::pin(async move {
            let mut state = self.state.borrow_mut();
            if let Some(code) = state.fail_writes.clone() {
                return Err(SnapshotError::Write(code));
            }
            let store = state
                .databases
                .get_mut(&self.database_name)
                .and_then(|database| database.stores.get_mut(store_name))
                .ok_or_else(|| SnapshotError::Write("NotFoundError".to_string()))?;
            store.insert(record.key.clone(), record.clone());
            Ok(())
        })
    }
}

/// Returns `Pending` once so concurrent callers can observe an in-flight open.
#[derive(Debug, Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
