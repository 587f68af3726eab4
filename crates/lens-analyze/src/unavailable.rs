//! Stand-in used when no analysis endpoint is configured.

use async_trait::async_trait;
use lens_types::{AnalyzeError, Analyzer, AuditReport};

/// Fails every call with the configuration problem that prevented a real client.
#[derive(Debug, Clone)]
pub struct UnavailableAnalyzer {
    reason: String,
}

impl UnavailableAnalyzer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Analyzer for UnavailableAnalyzer {
    async fn analyze(&self, _plan: &str) -> Result<AuditReport, AnalyzeError> {
        Err(AnalyzeError::Config(self.reason.clone()))
    }
}
