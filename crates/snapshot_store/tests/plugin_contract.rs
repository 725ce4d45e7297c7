use futures::executor::block_on;
use serde::{Deserialize, Serialize};
use snapshot_store::{
    MemorySnapshotBackend, PersistencePlugin, SnapshotError, SnapshotRecord, SnapshotStore,
    SnapshotStoreConfig, SNAPSHOT_RECORD_KEY, SNAPSHOT_STORE_NAME,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Document {
    id: String,
    tags: Vec<String>,
    score: Option<f64>,
}

fn doc(id: &str, tags: &[&str], score: Option<f64>) -> Document {
    Document {
        id: id.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        score,
    }
}

fn plugin(backend: &MemorySnapshotBackend) -> Box<dyn PersistencePlugin<Document>> {
    Box::new(SnapshotStore::new(
        backend.clone(),
        SnapshotStoreConfig::default(),
    ))
}

#[test]
fn plugin_reports_fixed_name() {
    let backend = MemorySnapshotBackend::default();
    assert_eq!(plugin(&backend).name(), "IndexedDBPersistence");
}

#[test]
fn host_restart_reloads_last_snapshot() {
    let backend = MemorySnapshotBackend::default();
    let docs = vec![
        Some(doc("a", &["x"], Some(1.5))),
        None,
        Some(doc("b", &[], None)),
    ];

    let first = plugin(&backend);
    assert_eq!(block_on(first.load()), None);
    block_on(first.save(&docs)).expect("save");
    drop(first);

    let second = plugin(&backend);
    assert_eq!(
        block_on(second.load()),
        Some(vec![doc("a", &["x"], Some(1.5)), doc("b", &[], None)])
    );
    assert_eq!(backend.open_count(), 2);
}

#[test]
fn saving_an_empty_collection_stores_an_empty_array() {
    let backend = MemorySnapshotBackend::default();
    let plugin = plugin(&backend);

    block_on(plugin.save(&[None, None])).expect("save");
    assert_eq!(block_on(plugin.load()), Some(Vec::new()));
}

#[test]
fn unsupported_environment_is_inert() {
    let backend = MemorySnapshotBackend::unavailable();
    let plugin = plugin(&backend);

    block_on(plugin.save(&[Some(doc("a", &[], None))])).expect("save is a no-op");
    assert_eq!(block_on(plugin.load()), None);
    assert_eq!(backend.open_count(), 0);
}

#[test]
fn payload_of_wrong_shape_loads_as_none() {
    let backend = MemorySnapshotBackend::default();
    backend.insert_raw_record(
        "SonicDBStore",
        SNAPSHOT_STORE_NAME,
        SnapshotRecord::snapshot(r#"{"id":"a"}"#),
    );

    assert_eq!(block_on(plugin(&backend).load()), None);
}

#[test]
fn open_failure_differs_between_load_and_save() {
    let backend = MemorySnapshotBackend::default();
    let plugin = plugin(&backend);

    backend.fail_next_open("AbortError");
    assert_eq!(block_on(plugin.load()), None);

    backend.fail_next_open("AbortError");
    assert_eq!(
        block_on(plugin.save(&[Some(doc("a", &[], None))])),
        Err(SnapshotError::Open("AbortError".to_string()))
    );
    assert!(backend
        .record("SonicDBStore", SNAPSHOT_STORE_NAME, SNAPSHOT_RECORD_KEY)
        .is_none());
}
