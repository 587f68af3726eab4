//! Ordered audit history mirrored into a `HistoryStore` on every mutation.

use lens_types::{AuditRecord, HistoryStore, InvalidRecord, StoreError};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("audit id already in history: {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Invalid(#[from] InvalidRecord),
}

/// In-memory collection in insertion order (oldest first).
///
/// The write lock is held across the store write so the collection and the slot
/// change together. A failed write keeps the in-memory change; the error is logged
/// and kept for [`HistoryManager::take_persist_error`].
pub struct HistoryManager {
    store: Arc<dyn HistoryStore>,
    records: RwLock<Vec<AuditRecord>>,
    persist_error: Mutex<Option<StoreError>>,
}

impl HistoryManager {
    /// Load the current slot contents.
    pub async fn open(store: Arc<dyn HistoryStore>) -> Self {
        let records = store.load().await;
        tracing::debug!(count = records.len(), "history loaded");
        Self {
            store,
            records: RwLock::new(records),
            persist_error: Mutex::new(None),
        }
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    /// Display order for history lists.
    pub async fn newest_first(&self) -> Vec<AuditRecord> {
        let mut out = self.records().await;
        out.reverse();
        out
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn find_by_id(&self, id: &str) -> Option<AuditRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Rejects records the store would drop on the next load.
    pub async fn append(&self, record: AuditRecord) -> Result<Vec<AuditRecord>, HistoryError> {
        record.validate()?;
        let mut guard = self.records.write().await;
        if guard.iter().any(|r| r.id == record.id) {
            return Err(HistoryError::DuplicateId(record.id));
        }
        tracing::info!(id = %record.id, risk = %record.risk_level, "audit appended");
        guard.push(record);
        self.persist(&guard).await;
        Ok(guard.clone())
    }

    /// Remove the record with `id`; unknown ids leave everything as is.
    pub async fn delete_by_id(&self, id: &str) -> Vec<AuditRecord> {
        let mut guard = self.records.write().await;
        let before = guard.len();
        guard.retain(|r| r.id != id);
        if guard.len() == before {
            tracing::debug!(id, "delete ignored, id not in history");
            return guard.clone();
        }
        tracing::info!(id, "audit deleted");
        self.persist(&guard).await;
        guard.clone()
    }

    /// Empty the collection and remove the slot.
    pub async fn clear(&self) -> Vec<AuditRecord> {
        let mut guard = self.records.write().await;
        guard.clear();
        if let Err(e) = self.store.clear().await {
            self.record_persist_error(e);
        }
        tracing::info!("history cleared");
        Vec::new()
    }

    /// Last store write failure since the previous call, if any.
    pub fn take_persist_error(&self) -> Option<StoreError> {
        self.persist_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    async fn persist(&self, records: &[AuditRecord]) {
        if let Err(e) = self.store.save(records).await {
            self.record_persist_error(e);
        }
    }

    fn record_persist_error(&self, e: StoreError) {
        tracing::warn!(error = %e, "failed to persist history");
        *self
            .persist_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(e);
    }
}
