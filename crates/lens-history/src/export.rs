//! CSV export of the full history and the sink that receives the file.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use std::fmt::Display;
use lens_types::AuditRecord;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "Date,Project Name,Risk Level,Justification";
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

const DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No history to export.")]
    NothingToExport,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("export encoding error: {0}")]
    Encoding(String),
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rendered CSV plus what a download needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl CsvExport {
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// Renders dates in the machine's local zone, or in a fixed UTC offset when one is given.
///
/// The local zone is resolved per timestamp, so audits on either side of a DST
/// change keep their own offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter {
    offset: Option<FixedOffset>,
}

impl CsvExporter {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    pub fn local() -> Self {
        Self { offset: None }
    }

    /// `M/D/YYYY, h:mm:ss AM` for `millis` in this exporter's zone.
    pub fn format_date(&self, millis: i64) -> String {
        match &self.offset {
            Some(offset) => format_timestamp(millis, offset),
            None => format_timestamp(millis, &Local),
        }
    }

    /// One header line and one fully quoted row per record, in history order.
    pub fn export(
        &self,
        records: &[AuditRecord],
        now: DateTime<Utc>,
    ) -> Result<CsvExport, ExportError> {
        if records.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let mut buf = Vec::with_capacity(CSV_HEADER.len() + 1 + records.len() * 128);
        buf.extend_from_slice(CSV_HEADER.as_bytes());
        buf.push(b'\n');

        let mut wtr = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(buf);
        for record in records {
            let date = self.format_date(record.timestamp);
            wtr.write_record([
                date.as_str(),
                record.project_name.as_str(),
                record.risk_level.as_str(),
                record.report.risk_justification.as_str(),
            ])?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ExportError::Encoding(e.to_string()))?;
        let content = String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))?;

        Ok(CsvExport {
            filename: export_filename(now),
            mime_type: CSV_MIME_TYPE,
            content,
        })
    }
}

/// `M/D/YYYY, h:mm:ss AM` in `tz`; out-of-range timestamps fall back to the raw millis.
pub fn format_timestamp<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.with_timezone(tz).format(DATE_FORMAT).to_string(),
        None => millis.to_string(),
    }
}

/// `projectlens_full_history_<YYYY-MM-DD>.csv`, dated in UTC.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!(
        "projectlens_full_history_{}.csv",
        now.date_naive().format("%Y-%m-%d")
    )
}

/// Receives a finished file.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under `filename`; returns where it went.
    async fn deliver(
        &self,
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
    ) -> Result<PathBuf, ExportError>;
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(
        &self,
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
    ) -> Result<PathBuf, ExportError> {
        // Only the final component, so a filename cannot escape the directory.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| ExportError::Encoding(format!("invalid file name: {}", filename)))?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), mime_type, size = bytes.len(), "download written");
        Ok(path)
    }
}
