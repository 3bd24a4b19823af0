//! ClaimRoot Storage
//!
//! An asynchronous key/value object store used to persist engine snapshots,
//! and a backup manager that keeps timestamped copies under a key prefix.
//! Nothing in the governance or ledger hot path touches storage.

pub mod error;
pub mod store;
pub mod backup;

pub use error::{StorageError, StorageResult};
pub use store::{
    HealthReport, HealthStatus, InMemoryObjectStore, ObjectEntry, ObjectMetadata, ObjectStore,
    OperationCounts, StorageStats, StoreItem, StoreReceipt, StoredObject, DEFAULT_CONTENT_TYPE,
};
pub use backup::{BackupManager, BackupRecord, BACKUP_TYPE, DEFAULT_BACKUP_PREFIX};
