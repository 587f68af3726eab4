//! SQLite-backed history slot: one key/value row holds the whole collection.

use crate::codec::{decode_history, encode_history};
use async_trait::async_trait;
use lens_types::{AuditRecord, HistoryStore, StoreError, HISTORY_SLOT_KEY};
use rusqlite::OptionalExtension;
use std::path::Path;

pub struct SqliteHistoryStore {
    conn: std::sync::Mutex<rusqlite::Connection>,
    key: String,
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path`, using the default slot key.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn =
            rusqlite::Connection::open(path).map_err(|e| StoreError::Other(e.to_string()))?;
        Self::with_connection(conn, HISTORY_SLOT_KEY)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            rusqlite::Connection::open_in_memory().map_err(|e| StoreError::Other(e.to_string()))?;
        Self::with_connection(conn, HISTORY_SLOT_KEY)
    }

    fn with_connection(conn: rusqlite::Connection, key: &str) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Other(e.to_string()))?;

        Ok(Self {
            conn: std::sync::Mutex::new(conn),
            key: key.to_string(),
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Other(format!("failed to acquire lock: {}", e)))?;
        f(&conn).map_err(|e| StoreError::Other(e.to_string()))
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn load(&self) -> Vec<AuditRecord> {
        let raw = self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM slots WHERE key = ?1",
                [&self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()
        });
        match raw {
            Ok(Some(raw)) => decode_history(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read history slot");
                Vec::new()
            }
        }
    }

    async fn save(&self, records: &[AuditRecord]) -> Result<(), StoreError> {
        let body = encode_history(records)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![self.key, body],
            )
        })?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM slots WHERE key = ?1", [&self.key]))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;
    use lens_types::RiskLevel;

    #[tokio::test]
    async fn slot_round_trips_through_sqlite() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        assert!(store.load().await.is_empty());

        let records = vec![
            record("a", RiskLevel::High, "Proj A"),
            record("b", RiskLevel::Low, "Proj B"),
        ];
        store.save(&records).await.unwrap();
        store.save(&records[1..]).await.unwrap();
        assert_eq!(store.load().await, records[1..].to_vec());

        store.clear().await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn reopen_reads_previous_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let a = record("a", RiskLevel::Medium, "Proj A");
        SqliteHistoryStore::new(&path)
            .unwrap()
            .save(std::slice::from_ref(&a))
            .await
            .unwrap();
        let reopened = SqliteHistoryStore::new(&path).unwrap();
        assert_eq!(reopened.load().await, vec![a]);
    }
}
