//! Host-supplied configuration for [`crate::SnapshotStore`].

use serde::{Deserialize, Serialize};

use crate::record::DEFAULT_DATABASE_NAME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Snapshot store settings. Missing fields fall back to their defaults.
pub struct SnapshotStoreConfig {
    /// Name of the local database holding the snapshot.
    pub database_name: String,
}

impl Default for SnapshotStoreConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

impl SnapshotStoreConfig {
    /// Overrides the database name. Blank names keep the default.
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.database_name = name;
        }
        self
    }

    /// Parses a JSON config object such as `{"database_name": "notes"}`.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not a valid config object.
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let parsed: Self = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        Ok(Self::default().with_database_name(parsed.database_name))
    }
}
