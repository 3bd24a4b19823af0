//! Timestamped backups on top of an [`ObjectStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectEntry, ObjectStore, StoreReceipt};

/// Key prefix backups are written under.
pub const DEFAULT_BACKUP_PREFIX: &str = "backups/";

/// Value of the `type` metadata entry on every backup object.
pub const BACKUP_TYPE: &str = "SYSTEM_BACKUP";

/// Envelope written for each backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub payload: T,
}

/// Creates, restores and lists backups of any serializable payload.
pub struct BackupManager {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl BackupManager {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_prefix(store, DEFAULT_BACKUP_PREFIX)
    }

    /// Use a custom key prefix. A trailing `/` is added when missing.
    pub fn with_prefix(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { store, prefix }
    }

    /// Write `payload` as a new backup.
    ///
    /// Without an explicit id the backup is named `backup-<unix millis>`.
    #[instrument(skip(self, payload))]
    pub async fn create_backup<'a, T: Serialize + Sync>(
        &self,
        id: Option<&str>,
        payload: &'a T,
    ) -> StorageResult<(BackupRecord<&'a T>, StoreReceipt)> {
        let created_at = Utc::now();
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| format!("backup-{}", created_at.timestamp_millis()));

        let record = BackupRecord {
            id,
            created_at,
            payload,
        };
        let data = serde_json::to_value(&record)?;

        let mut metadata = BTreeMap::new();
        metadata.insert("type".to_string(), BACKUP_TYPE.to_string());

        let receipt = self.store.store(&self.key(&record.id), data, metadata).await?;

        info!(backup_id = %record.id, size = receipt.size, "Backup created");
        Ok((record, receipt))
    }

    /// Read a backup back.
    #[instrument(skip(self))]
    pub async fn restore_backup<T: DeserializeOwned>(&self, id: &str) -> StorageResult<BackupRecord<T>> {
        let object = match self.store.retrieve(&self.key(id)).await? {
            Some(object) => object,
            None => {
                warn!("Backup not found");
                return Err(StorageError::BackupNotFound(id.to_string()));
            }
        };

        let record: BackupRecord<T> = serde_json::from_value(object.data)?;
        info!(created_at = %record.created_at, "Backup restored");
        Ok(record)
    }

    /// Backups present in the store, sorted by key.
    pub async fn list_backups(&self) -> StorageResult<Vec<ObjectEntry>> {
        self.store.list(&self.prefix).await
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }
}
