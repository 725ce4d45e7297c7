//! Error type shared by the snapshot store and its storage backends.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures raised while opening, reading, or writing the snapshot record.
///
/// The type is `Clone` so a single connection attempt can be awaited by several callers.
pub enum SnapshotError {
    /// The execution context exposes no structured local-storage facility.
    #[error("IndexedDB is not supported in this environment")]
    Unsupported,
    /// The storage engine refused to open or upgrade the database.
    #[error("IndexedDB open error: {0}")]
    Open(String),
    /// The read transaction failed before a record could be returned.
    #[error("failed to retrieve snapshot from IndexedDB: {0}")]
    Read(String),
    /// A snapshot record exists but its payload is not a valid document array.
    #[error("failed to parse stored snapshot data: {0}")]
    Corrupt(String),
    /// The document collection could not be serialized.
    #[error("failed to serialize snapshot data: {0}")]
    Serialize(String),
    /// The write transaction failed.
    #[error("IndexedDB save error: {0}")]
    Write(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wraps_engine_message() {
        let err = SnapshotError::Open("VersionError".to_string());
        assert_eq!(err.to_string(), "IndexedDB open error: VersionError");

        let err = SnapshotError::Write("QuotaExceededError".to_string());
        assert_eq!(err.to_string(), "IndexedDB save error: QuotaExceededError");
    }

    #[test]
    fn corrupt_and_absent_capability_are_distinct() {
        assert_ne!(
            SnapshotError::Corrupt("x".to_string()),
            SnapshotError::Read("x".to_string())
        );
        assert_eq!(
            SnapshotError::Unsupported.to_string(),
            "IndexedDB is not supported in this environment"
        );
    }
}
