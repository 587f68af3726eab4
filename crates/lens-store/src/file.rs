//! JSON file history slot (persists across restarts).

use crate::codec::{decode_history, encode_history};
use async_trait::async_trait;
use lens_types::{AuditRecord, HistoryStore, StoreError};
use std::path::{Path, PathBuf};

/// Whole history in one JSON file. Writes go to a sibling temp file that is then
/// renamed over the target.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        match self.path.file_name() {
            Some(name) => {
                let mut name = name.to_os_string();
                name.push(".tmp");
                self.path.with_file_name(name)
            }
            None => self.path.with_extension("tmp"),
        }
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn load(&self) -> Vec<AuditRecord> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => decode_history(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read history file");
                Vec::new()
            }
        }
    }

    async fn save(&self, records: &[AuditRecord]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let body = encode_history(records)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, body.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), count = records.len(), "history saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;
    use lens_types::RiskLevel;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistoryStore::new(dir.path().join("history.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_survives_reopen_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let records = vec![
            record("a", RiskLevel::High, "Proj A"),
            record("b", RiskLevel::Low, "Proj B"),
        ];
        JsonFileHistoryStore::new(&path)
            .save(&records)
            .await
            .unwrap();

        let reopened = JsonFileHistoryStore::new(&path);
        assert_eq!(reopened.load().await, records);
        assert!(!dir.path().join("nested").join("history.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(JsonFileHistoryStore::new(&path).load().await.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonFileHistoryStore::new(&path);
        store
            .save(&[record("a", RiskLevel::Medium, "Proj A")])
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(!path.exists());
        store.clear().await.unwrap();
        assert!(store.load().await.is_empty());
    }
}
