//! Error types for beacon-state

use thiserror::Error;

/// Errors from status ledger operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger contents could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A backing file exists but does not hold a ledger
    #[error("Corrupt ledger file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// A previous holder of the ledger lock panicked
    #[error("Ledger lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}
