//! In-memory history slot (process lifetime only).

use crate::codec::{decode_history, encode_history};
use async_trait::async_trait;
use lens_types::{AuditRecord, HistoryStore, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Slot kept in memory as serialized text, so reads go through the same decode path
/// as the durable backends.
pub struct InMemoryHistoryStore {
    slot: RwLock<Option<String>>,
    fail_writes: AtomicBool,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Start with arbitrary slot contents (possibly corrupt).
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Current slot text, `None` when the slot is absent.
    pub async fn raw(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    /// Make subsequent `save`/`clear` calls fail, as a full quota would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self) -> Vec<AuditRecord> {
        match self.slot.read().await.as_deref() {
            Some(raw) => decode_history(raw),
            None => Vec::new(),
        }
    }

    async fn save(&self, records: &[AuditRecord]) -> Result<(), StoreError> {
        self.check_writable()?;
        let raw = encode_history(records)?;
        *self.slot.write().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.slot.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;
    use lens_types::RiskLevel;

    #[tokio::test]
    async fn empty_slot_loads_nothing() {
        let store = InMemoryHistoryStore::new();
        assert!(store.load().await.is_empty());
        assert!(store.raw().await.is_none());
    }

    #[tokio::test]
    async fn save_overwrites_and_clear_removes() {
        let store = InMemoryHistoryStore::new();
        store
            .save(&[record("a", RiskLevel::High, "Proj A")])
            .await
            .unwrap();
        let b = record("b", RiskLevel::Low, "Proj B");
        store.save(std::slice::from_ref(&b)).await.unwrap();
        assert_eq!(store.load().await, vec![b]);

        store.clear().await.unwrap();
        assert!(store.raw().await.is_none());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_slot_loads_empty() {
        let store = InMemoryHistoryStore::with_raw("[{\"id\":");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn failing_writes_leave_slot_untouched() {
        let store = InMemoryHistoryStore::new();
        let a = record("a", RiskLevel::Medium, "Proj A");
        store.save(std::slice::from_ref(&a)).await.unwrap();
        store.set_fail_writes(true);
        assert!(store.save(&[]).await.is_err());
        assert!(store.clear().await.is_err());
        assert_eq!(store.load().await, vec![a]);
    }
}
