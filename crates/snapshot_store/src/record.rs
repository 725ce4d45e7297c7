//! Persisted layout: database/store names, schema version, and the snapshot record shape.

use serde::{Deserialize, Serialize};

/// Database name used when the host does not configure one.
pub const DEFAULT_DATABASE_NAME: &str = "SonicDBStore";
/// Object store holding the snapshot record.
pub const SNAPSHOT_STORE_NAME: &str = "documents";
/// Key path of [`SNAPSHOT_STORE_NAME`].
pub const SNAPSHOT_KEY_PATH: &str = "key";
/// Schema version requested when opening the database.
pub const SCHEMA_VERSION: u32 = 1;
/// Fixed key of the only record ever written.
pub const SNAPSHOT_RECORD_KEY: &str = "sonicdb_snapshot";
/// Plugin name reported to the host document store.
pub const PLUGIN_NAME: &str = "IndexedDBPersistence";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Stored snapshot record: `{ key, data }` where `data` is the JSON-encoded document array.
pub struct SnapshotRecord {
    /// Record key, always [`SNAPSHOT_RECORD_KEY`] for records written by this crate.
    pub key: String,
    /// Serialized document array. `None` when the stored record carries no payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl SnapshotRecord {
    /// Builds the snapshot record for an already-serialized document array.
    pub fn snapshot(data: impl Into<String>) -> Self {
        Self {
            key: SNAPSHOT_RECORD_KEY.to_string(),
            data: Some(data.into()),
        }
    }

    /// Returns the payload when it is present and non-empty.
    pub fn payload(&self) -> Option<&str> {
        self.data.as_deref().filter(|data| !data.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Parameters of a database open request.
pub struct OpenRequest {
    /// Database name.
    pub database_name: String,
    /// Schema version; a higher version than stored triggers the upgrade path.
    pub version: u32,
    /// Object store created during upgrade when absent.
    pub store_name: String,
    /// Key path of the created object store.
    pub key_path: String,
}

impl OpenRequest {
    /// Open request for the snapshot layout in `database_name`.
    pub fn snapshot(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            version: SCHEMA_VERSION,
            store_name: SNAPSHOT_STORE_NAME.to_string(),
            key_path: SNAPSHOT_KEY_PATH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn snapshot_record_serialization_shape_is_compatible() {
        let record = SnapshotRecord::snapshot("[]");
        let value = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(value, json!({"key": "sonicdb_snapshot", "data": "[]"}));
    }

    #[test]
    fn record_without_data_field_deserializes_to_none() {
        let record: SnapshotRecord =
            serde_json::from_value(json!({"key": "sonicdb_snapshot"})).expect("deserialize");
        assert_eq!(record.data, None);
        assert_eq!(record.payload(), None);
    }

    #[test]
    fn empty_payload_counts_as_absent() {
        let record = SnapshotRecord::snapshot("");
        assert_eq!(record.payload(), None);
        assert_eq!(SnapshotRecord::snapshot("[1]").payload(), Some("[1]"));
    }

    #[test]
    fn open_request_targets_fixed_layout() {
        let request = OpenRequest::snapshot("custom");
        assert_eq!(request.database_name, "custom");
        assert_eq!(request.version, 1);
        assert_eq!(request.store_name, "documents");
        assert_eq!(request.key_path, "key");
    }
}
