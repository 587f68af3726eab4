//! Audit history: the store-backed collection plus the views derived from it.

mod export;
mod manager;
mod trend;

pub use export::{
    export_filename, format_timestamp, CsvExport, CsvExporter, DirectorySink, DownloadSink,
    ExportError, CSV_HEADER, CSV_MIME_TYPE,
};
pub use lens_types::{AuditRecord, HistoryStore, RiskLevel, StoreError};
pub use manager::{HistoryError, HistoryManager};
pub use trend::{project, Canvas, GridLine, TrendPoint, TrendSeries};

#[cfg(test)]
pub(crate) mod fixtures {
    use lens_types::{AuditRecord, AuditReport, RiskLevel};

    pub fn record(id: &str, level: RiskLevel, name: &str) -> AuditRecord {
        AuditRecord {
            id: id.to_string(),
            timestamp: 1_700_000_000_000,
            risk_level: level,
            project_name: name.to_string(),
            report: AuditReport {
                risk_level: level,
                risk_justification: format!("{} looks {}", name, level),
                suggested_project_name: String::new(),
                top_risks: Vec::new(),
                fix_now_suggestions: Vec::new(),
            },
            plan: format!("plan for {}", name),
        }
    }
}
