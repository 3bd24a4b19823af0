//! Object store trait and in-memory implementation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use claimroot_crypto::sha256_hex;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{StorageError, StorageResult};

/// Content type recorded when the caller does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Custom metadata key that overrides the content type.
const CONTENT_TYPE_KEY: &str = "content_type";

/// Acknowledgement of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReceipt {
    pub key: String,
    pub size: u64,
    pub etag: String,
}

/// Metadata kept alongside each object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    /// Length in bytes of the serialized JSON.
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub content_type: String,
    pub custom: BTreeMap<String, String>,
    pub etag: String,
}

/// An object and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub data: Value,
    pub metadata: ObjectMetadata,
}

/// Listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub etag: String,
}

/// Input for bulk writes.
#[derive(Debug, Clone)]
pub struct StoreItem {
    pub key: String,
    pub data: Value,
    pub metadata: BTreeMap<String, String>,
}

impl StoreItem {
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            data,
            metadata: BTreeMap::new(),
        }
    }
}

/// Per-operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCounts {
    pub stores: u64,
    pub retrieves: u64,
    pub deletes: u64,
    pub lists: u64,
}

/// Store-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_objects: usize,
    pub total_size: u64,
    pub operations: OperationCounts,
    /// Rounded mean object size; zero when empty.
    pub average_object_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    NotInitialized,
}

/// Result of a health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub initialized: bool,
    pub stats: StorageStats,
}

/// Trait for object stores holding JSON documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get the store name.
    fn name(&self) -> &str;

    /// Write `data` under `key`, replacing any previous object.
    async fn store(
        &self,
        key: &str,
        data: Value,
        metadata: BTreeMap<String, String>,
    ) -> StorageResult<StoreReceipt>;

    /// Read the object under `key`.
    async fn retrieve(&self, key: &str) -> StorageResult<Option<StoredObject>>;

    /// Remove the object under `key`. Returns false if there was none.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Entries whose key starts with `prefix`, sorted by key.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectEntry>>;

    /// Current statistics.
    fn stats(&self) -> StorageStats;
}

/// Object store backed by a concurrent map.
///
/// Every operation other than [`InMemoryObjectStore::initialize`],
/// [`InMemoryObjectStore::clear`] and the health probe fails with
/// [`StorageError::NotInitialized`] until the store is initialized.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, StoredObject>,
    initialized: AtomicBool,
    stores: AtomicU64,
    retrieves: AtomicU64,
    deletes: AtomicU64,
    lists: AtomicU64,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the store ready for use.
    pub async fn initialize(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        info!(store = self.name(), "Object store initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Store several objects in order, stopping at the first failure.
    pub async fn bulk_store(&self, items: Vec<StoreItem>) -> StorageResult<Vec<StoreReceipt>> {
        let mut receipts = Vec::with_capacity(items.len());
        for item in items {
            receipts.push(self.store(&item.key, item.data, item.metadata).await?);
        }
        Ok(receipts)
    }

    /// Delete several keys, reporting per key whether an object was removed.
    pub async fn bulk_delete(&self, keys: &[&str]) -> StorageResult<Vec<bool>> {
        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            removed.push(self.delete(key).await?);
        }
        Ok(removed)
    }

    /// Copy an object and its custom metadata to a new key.
    #[instrument(skip(self))]
    pub async fn copy(&self, source: &str, destination: &str) -> StorageResult<StoreReceipt> {
        let object = self
            .retrieve(source)
            .await?
            .ok_or_else(|| StorageError::ObjectNotFound(source.to_string()))?;

        self.store(destination, object.data, object.metadata.custom).await
    }

    /// Drop every object and reset the counters.
    pub async fn clear(&self) {
        self.objects.clear();
        for counter in [&self.stores, &self.retrieves, &self.deletes, &self.lists] {
            counter.store(0, Ordering::Relaxed);
        }
        info!(store = self.name(), "Object store cleared");
    }

    pub async fn health_check(&self) -> HealthReport {
        let initialized = self.is_initialized();
        HealthReport {
            status: if initialized {
                HealthStatus::Healthy
            } else {
                HealthStatus::NotInitialized
            },
            initialized,
            stats: self.stats(),
        }
    }

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    fn etag(serialized: &str) -> String {
        format!("\"{}\"", sha256_hex(serialized.as_bytes()))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    #[instrument(skip(self, data, custom))]
    async fn store(
        &self,
        key: &str,
        data: Value,
        custom: BTreeMap<String, String>,
    ) -> StorageResult<StoreReceipt> {
        self.ensure_initialized()?;

        let serialized = serde_json::to_string(&data)?;
        let size = serialized.len() as u64;
        let etag = Self::etag(&serialized);
        let now = Utc::now();

        let created = self
            .objects
            .get(key)
            .map(|existing| existing.metadata.created)
            .unwrap_or(now);

        let content_type = custom
            .get(CONTENT_TYPE_KEY)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let metadata = ObjectMetadata {
            key: key.to_string(),
            size,
            created,
            modified: now,
            content_type,
            custom,
            etag: etag.clone(),
        };

        self.objects.insert(key.to_string(), StoredObject { data, metadata });
        self.stores.fetch_add(1, Ordering::Relaxed);

        debug!(size, etag = %etag, "Object stored");

        Ok(StoreReceipt {
            key: key.to_string(),
            size,
            etag,
        })
    }

    async fn retrieve(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        self.ensure_initialized()?;
        self.retrieves.fetch_add(1, Ordering::Relaxed);

        Ok(self.objects.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        self.ensure_initialized()?;

        let removed = self.objects.remove(key).is_some();
        if removed {
            self.deletes.fetch_add(1, Ordering::Relaxed);
            debug!(key, "Object deleted");
        }
        Ok(removed)
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectEntry>> {
        self.ensure_initialized()?;
        self.lists.fetch_add(1, Ordering::Relaxed);

        let mut entries: Vec<ObjectEntry> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| {
                let meta = &entry.value().metadata;
                ObjectEntry {
                    key: meta.key.clone(),
                    size: meta.size,
                    modified: meta.modified,
                    etag: meta.etag.clone(),
                }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn stats(&self) -> StorageStats {
        let total_objects = self.objects.len();
        let total_size: u64 = self.objects.iter().map(|e| e.value().metadata.size).sum();
        let average_object_size = if total_objects == 0 {
            0
        } else {
            let n = total_objects as u64;
            (total_size + n / 2) / n
        };

        StorageStats {
            total_objects,
            total_size,
            operations: OperationCounts {
                stores: self.stores.load(Ordering::Relaxed),
                retrieves: self.retrieves.load(Ordering::Relaxed),
                deletes: self.deletes.load(Ordering::Relaxed),
                lists: self.lists.load(Ordering::Relaxed),
            },
            average_object_size,
        }
    }
}
