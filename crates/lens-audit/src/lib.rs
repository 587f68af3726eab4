//! Audit orchestration: runs analyses, records results, tracks the editable view.

mod sample;
mod session;

pub use lens_types::{AnalyzeError, Analyzer, AuditRecord, AuditReport};
pub use sample::SAMPLE_PLAN;
pub use session::{
    resolve_project_name, AuditSession, EditorView, SelectOutcome, SessionState, SubmitOutcome,
    UNEXPECTED_ERROR,
};
