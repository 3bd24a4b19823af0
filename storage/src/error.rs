//! Storage error types.

use thiserror::Error;

/// Errors from the object store and backup manager.
#[derive(Debug, Error)]
pub enum StorageError {
    /// `initialize` has not been called.
    #[error("Storage not initialized")]
    NotInitialized,

    /// No object under the key.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// No backup with the id.
    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    /// Payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
