//! AuditSession: Idle/Running state machine around the analyzer and the history.

use chrono::{DateTime, Local, Utc};
use lens_history::{CsvExport, CsvExporter, DownloadSink, ExportError, HistoryManager};
use lens_types::{Analyzer, AuditRecord, AuditReport};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shown when an analysis fails without a message of its own.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// An analysis call is in flight.
    Running,
}

/// Form state: the plan being edited and whatever report is on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorView {
    pub plan: String,
    pub project_name: String,
    pub report: Option<AuditReport>,
    /// History record the view is showing, if any.
    pub active_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Plan was blank; nothing happened.
    Skipped,
    /// Another analysis is still running.
    Busy,
    Completed(AuditRecord),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Selected(AuditRecord),
    NotFound,
    Busy,
}

/// Resets the running flag when the analysis cycle ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AuditSession {
    analyzer: Arc<dyn Analyzer>,
    history: HistoryManager,
    running: AtomicBool,
    view: RwLock<EditorView>,
}

impl AuditSession {
    pub fn new(analyzer: Arc<dyn Analyzer>, history: HistoryManager) -> Self {
        Self {
            analyzer,
            history,
            running: AtomicBool::new(false),
            view: RwLock::new(EditorView::default()),
        }
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        if self.running.load(Ordering::SeqCst) {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    pub async fn view(&self) -> EditorView {
        self.view.read().await.clone()
    }

    pub async fn set_plan(&self, plan: impl Into<String>) {
        self.view.write().await.plan = plan.into();
    }

    pub async fn set_project_name(&self, name: impl Into<String>) {
        self.view.write().await.project_name = name.into();
    }

    /// Put the built-in sample plan in the editor and drop any typed name.
    pub async fn load_sample(&self) {
        let mut view = self.view.write().await;
        view.project_name.clear();
        view.plan = crate::SAMPLE_PLAN.to_string();
    }

    /// Run one analysis of the current plan.
    ///
    /// On success the record is appended to the history and becomes the active one.
    /// On failure the message lands in `EditorView::error` and the history is untouched.
    pub async fn submit(&self) -> SubmitOutcome {
        let (plan, typed_name) = {
            let view = self.view.read().await;
            (view.plan.clone(), view.project_name.clone())
        };
        if plan.trim().is_empty() {
            return SubmitOutcome::Skipped;
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("submit ignored, analysis already running");
            return SubmitOutcome::Busy;
        }
        let _running = RunningGuard(&self.running);

        {
            let mut view = self.view.write().await;
            view.error = None;
            view.active_id = None;
        }

        let report = match self.analyzer.analyze(&plan).await {
            Ok(report) => report,
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = UNEXPECTED_ERROR.to_string();
                }
                tracing::error!(error = %message, "analysis failed");
                self.view.write().await.error = Some(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };

        let now = Utc::now();
        let record = AuditRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: now.timestamp_millis(),
            risk_level: report.risk_level,
            project_name: resolve_project_name(&typed_name, &report.suggested_project_name, now),
            report,
            plan,
        };
        if let Err(e) = self.history.append(record.clone()).await {
            let message = e.to_string();
            self.view.write().await.error = Some(message.clone());
            return SubmitOutcome::Failed(message);
        }

        let mut view = self.view.write().await;
        view.report = Some(record.report.clone());
        view.active_id = Some(record.id.clone());
        if typed_name.trim().is_empty() {
            view.project_name = record.project_name.clone();
        }
        SubmitOutcome::Completed(record)
    }

    /// Reopen a past audit into the editor. Not allowed while an analysis runs.
    pub async fn select(&self, id: &str) -> SelectOutcome {
        if self.state() == SessionState::Running {
            return SelectOutcome::Busy;
        }
        let Some(record) = self.history.find_by_id(id).await else {
            return SelectOutcome::NotFound;
        };
        let mut view = self.view.write().await;
        view.report = Some(record.report.clone());
        view.plan = record.plan.clone();
        view.project_name = record.project_name.clone();
        view.active_id = Some(record.id.clone());
        SelectOutcome::Selected(record)
    }

    /// Delete a past audit; clears the editor if it was showing that audit.
    pub async fn delete(&self, id: &str) -> Vec<AuditRecord> {
        let remaining = self.history.delete_by_id(id).await;
        let mut view = self.view.write().await;
        if view.active_id.as_deref() == Some(id) {
            view.report = None;
            view.plan.clear();
            view.project_name.clear();
            view.active_id = None;
        }
        remaining
    }

    pub async fn clear_history(&self) {
        self.history.clear().await;
        self.view.write().await.active_id = None;
    }

    /// Clear the editor. Does not touch the history.
    pub async fn reset(&self) {
        let mut view = self.view.write().await;
        view.report = None;
        view.plan.clear();
        view.project_name.clear();
        view.active_id = None;
    }

    pub async fn export_csv(
        &self,
        exporter: &CsvExporter,
        now: DateTime<Utc>,
    ) -> Result<CsvExport, ExportError> {
        let records = self.history.records().await;
        exporter.export(&records, now)
    }

    /// Export and hand the file to `sink`.
    pub async fn export_to(
        &self,
        sink: &dyn DownloadSink,
        exporter: &CsvExporter,
    ) -> Result<PathBuf, ExportError> {
        let export = self.export_csv(exporter, Utc::now()).await?;
        sink.deliver(export.as_bytes(), export.mime_type, &export.filename)
            .await
    }
}

/// Typed name, else the suggested one, else `Audit <date>`.
pub fn resolve_project_name(typed: &str, suggested: &str, now: DateTime<Utc>) -> String {
    let typed = typed.trim();
    if !typed.is_empty() {
        return typed.to_string();
    }
    let suggested = suggested.trim();
    if !suggested.is_empty() {
        return suggested.to_string();
    }
    format!("Audit {}", now.with_timezone(&Local).format("%-m/%-d/%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn typed_name_wins() {
        let now = Utc::now();
        assert_eq!(resolve_project_name("  Mine ", "Theirs", now), "Mine");
        assert_eq!(resolve_project_name(" ", "Theirs", now), "Theirs");
    }

    #[test]
    fn falls_back_to_dated_name() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let expected = format!(
            "Audit {}",
            now.with_timezone(&Local).format("%-m/%-d/%Y")
        );
        let name = resolve_project_name("", "  ", now);
        assert_eq!(name, expected);
        assert!(name.starts_with("Audit 6/1"));
    }
}
