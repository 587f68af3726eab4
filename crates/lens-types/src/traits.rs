//! Traits for the durable history slot and the analysis service.

use crate::{AuditRecord, AuditReport};
use async_trait::async_trait;

/// Durable slot holding the whole history collection as one blob.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read the slot. Missing or unreadable data yields an empty collection; this never fails.
    async fn load(&self) -> Vec<AuditRecord>;

    /// Overwrite the slot with `records`. Readers never observe a partial write.
    async fn save(&self, records: &[AuditRecord]) -> Result<(), StoreError>;

    /// Remove the slot entirely.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// External service turning plan text into a structured report.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, plan: &str) -> Result<AuditReport, AnalyzeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Other(String),
}

/// Analysis failure. `Display` is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    Other(String),
    #[error("AI service error: {0}")]
    Api(String),
    #[error("Invalid response format from AI service.")]
    InvalidResponse(String),
    #[error("No response from AI service.")]
    EmptyResponse,
    #[error("AI service is not configured: {0}")]
    Config(String),
}
