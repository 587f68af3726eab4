//! Scripted analyzer for tests: no network, outcomes queued up front.

use async_trait::async_trait;
use lens_types::{AnalyzeError, Analyzer, AuditReport, RiskItem, RiskLevel, Suggestion};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Returns queued outcomes in order, then a fixed fallback report.
pub struct MockAnalyzer {
    script: Mutex<VecDeque<Result<AuditReport, String>>>,
    fallback: AuditReport,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Self::report(RiskLevel::Medium, "Mock Project"),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// A small but complete report.
    pub fn report(level: RiskLevel, suggested_name: &str) -> AuditReport {
        AuditReport {
            risk_level: level,
            risk_justification: format!("Overall risk is {}.", level),
            suggested_project_name: suggested_name.to_string(),
            top_risks: vec![RiskItem {
                name: "Ownership".to_string(),
                why: "No accountable owner.".to_string(),
                reference: "Everyone will help".to_string(),
                severity: level,
            }],
            fix_now_suggestions: vec![Suggestion {
                risk_name: "Ownership".to_string(),
                action: "Assign a single lead.".to_string(),
            }],
        }
    }

    pub fn push_ok(self, report: AuditReport) -> Self {
        self.lock_script().push_back(Ok(report));
        self
    }

    pub fn push_err(self, message: impl Into<String>) -> Self {
        self.lock_script().push_back(Err(message.into()));
        self
    }

    /// Hold every call until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<AuditReport, String>>> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, _plan: &str) -> Result<AuditReport, AnalyzeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        let next = self.lock_script().pop_front();
        match next {
            Some(Ok(report)) => Ok(report),
            Some(Err(message)) => Err(AnalyzeError::Other(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}
