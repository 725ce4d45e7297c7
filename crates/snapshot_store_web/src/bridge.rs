//! IndexedDB interop for the snapshot backend.
//!
//! On `wasm32` this module drives the browser's IndexedDB factory through a small JS shim; on
//! other targets it reports the facility as absent.

use snapshot_store::{OpenRequest, SnapshotError, SnapshotRecord};

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::*;
    use js_sys::{Promise, Reflect};
    use serde::Serialize;
    use serde_wasm_bindgen::Serializer;
    use wasm_bindgen::{prelude::*, JsCast};
    use wasm_bindgen_futures::JsFuture;

    use crate::indexed_db::INDEXED_DB_GLOBALS;

    #[wasm_bindgen(inline_js = r#"
export function jsSnapshotOpen(factory, name, version, storeName, keyPath) {
  return new Promise((resolve, reject) => {
    const req = factory.open(name, version);
    req.onupgradeneeded = () => {
      const db = req.result;
      if (!db.objectStoreNames.contains(storeName)) {
        db.createObjectStore(storeName, { keyPath });
      }
    };
    req.onsuccess = () => resolve(req.result);
    req.onerror = () => reject(req.error || new Error('Failed to open IndexedDB'));
  });
}

export function jsSnapshotGet(db, storeName, key) {
  return new Promise((resolve, reject) => {
    const tx = db.transaction([storeName], 'readonly');
    const req = tx.objectStore(storeName).get(key);
    req.onsuccess = () => resolve(req.result === undefined ? null : req.result);
    req.onerror = () => reject(req.error || new Error('Failed to retrieve data from IndexedDB'));
  });
}

export function jsSnapshotPut(db, storeName, record) {
  return new Promise((resolve, reject) => {
    const tx = db.transaction([storeName], 'readwrite');
    const req = tx.objectStore(storeName).put(record);
    req.onsuccess = () => resolve(null);
    req.onerror = () => reject(req.error || new Error('IndexedDB put failed'));
  });
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsSnapshotOpen)]
        fn js_snapshot_open(
            factory: &JsValue,
            name: &str,
            version: u32,
            store_name: &str,
            key_path: &str,
        ) -> Promise;
        #[wasm_bindgen(js_name = jsSnapshotGet)]
        fn js_snapshot_get(db: &JsValue, store_name: &str, key: &str) -> Promise;
        #[wasm_bindgen(js_name = jsSnapshotPut)]
        fn js_snapshot_put(db: &JsValue, store_name: &str, record: JsValue) -> Promise;
    }

    #[derive(Debug, Clone)]
    pub struct IdbFactory(JsValue);

    #[derive(Debug)]
    pub struct DbHandle(JsValue);

    fn is_missing(value: &JsValue) -> bool {
        value.is_null() || value.is_undefined()
    }

    fn js_error_to_string(err: JsValue) -> String {
        if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
            return format!("{}: {}", exception.name(), exception.message());
        }
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    async fn await_promise(promise: Promise) -> Result<JsValue, String> {
        JsFuture::from(promise).await.map_err(js_error_to_string)
    }

    pub fn probe_factory() -> Option<IdbFactory> {
        let global = js_sys::global();
        INDEXED_DB_GLOBALS.iter().find_map(|name| {
            let factory = Reflect::get(&global, &JsValue::from_str(name)).ok()?;
            if is_missing(&factory) {
                return None;
            }
            if *name != INDEXED_DB_GLOBALS[0] {
                leptos::logging::log!("[snapshot store] using prefixed IndexedDB factory `{name}`");
            }
            Some(IdbFactory(factory))
        })
    }

    pub async fn open_database(
        factory: &IdbFactory,
        request: &OpenRequest,
    ) -> Result<DbHandle, SnapshotError> {
        let promise = js_snapshot_open(
            &factory.0,
            &request.database_name,
            request.version,
            &request.store_name,
            &request.key_path,
        );
        await_promise(promise)
            .await
            .map(DbHandle)
            .map_err(SnapshotError::Open)
    }

    pub async fn get_record(
        db: &DbHandle,
        store_name: &str,
        key: &str,
    ) -> Result<Option<SnapshotRecord>, SnapshotError> {
        let value = await_promise(js_snapshot_get(&db.0, store_name, key))
            .await
            .map_err(SnapshotError::Read)?;
        if is_missing(&value) {
            return Ok(None);
        }

        let data = Reflect::get(&value, &JsValue::from_str("data"))
            .map_err(|e| SnapshotError::Read(js_error_to_string(e)))?;
        let data = if is_missing(&data) {
            None
        } else {
            Some(data.as_string().ok_or_else(|| {
                SnapshotError::Corrupt("stored snapshot payload is not a string".to_string())
            })?)
        };
        Ok(Some(SnapshotRecord {
            key: key.to_string(),
            data,
        }))
    }

    pub async fn put_record(
        db: &DbHandle,
        store_name: &str,
        record: &SnapshotRecord,
    ) -> Result<(), SnapshotError> {
        let value = record
            .serialize(&Serializer::json_compatible())
            .map_err(|e| SnapshotError::Serialize(e.to_string()))?;
        await_promise(js_snapshot_put(&db.0, store_name, value))
            .await
            .map_err(SnapshotError::Write)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    #[derive(Debug, Clone)]
    pub struct IdbFactory {
        pub(super) _private: (),
    }

    #[derive(Debug)]
    pub struct DbHandle {
        pub(super) _private: (),
    }

    pub fn probe_factory() -> Option<IdbFactory> {
        None
    }

    pub async fn open_database(
        _factory: &IdbFactory,
        _request: &OpenRequest,
    ) -> Result<DbHandle, SnapshotError> {
        Err(SnapshotError::Unsupported)
    }

    pub async fn get_record(
        _db: &DbHandle,
        _store_name: &str,
        _key: &str,
    ) -> Result<Option<SnapshotRecord>, SnapshotError> {
        Err(SnapshotError::Unsupported)
    }

    pub async fn put_record(
        _db: &DbHandle,
        _store_name: &str,
        _record: &SnapshotRecord,
    ) -> Result<(), SnapshotError> {
        Err(SnapshotError::Unsupported)
    }
}

pub use imp::{get_record, open_database, probe_factory, put_record, DbHandle, IdbFactory};

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_reports_no_factory() {
        assert!(probe_factory().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_operations_are_unsupported() {
        let factory = imp::IdbFactory { _private: () };
        let handle = imp::DbHandle { _private: () };

        assert_eq!(
            block_on(open_database(&factory, &OpenRequest::snapshot("db"))).map(|_| ()),
            Err(SnapshotError::Unsupported)
        );
        assert_eq!(
            block_on(get_record(&handle, "documents", "sonicdb_snapshot")),
            Err(SnapshotError::Unsupported)
        );
        assert_eq!(
            block_on(put_record(
                &handle,
                "documents",
                &SnapshotRecord::snapshot("[]")
            )),
            Err(SnapshotError::Unsupported)
        );
    }
}
