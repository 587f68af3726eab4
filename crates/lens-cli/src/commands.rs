//! Command implementations. Output goes to the given writer so commands can be tested.

use crate::cli::{AuditArgs, Cli, Command, TrendArgs};
use lens_audit::{AuditSession, SelectOutcome, SubmitOutcome};
use lens_history::{
    project, Canvas, CsvExporter, DirectorySink, ExportError, HistoryManager, TrendSeries,
};
use lens_types::{AnalyzeError, Analyzer, AuditRecord, HistoryStore, StoreError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("audit failed: {0}")]
    AuditFailed(String),
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pick the history backend for `path`.
pub fn open_store(path: &Path) -> CliResult<Arc<dyn HistoryStore>> {
    #[cfg(feature = "sqlite")]
    {
        let is_sqlite = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("db") | Some("sqlite")
        );
        if is_sqlite {
            return Ok(Arc::new(lens_store::SqliteHistoryStore::new(path)?));
        }
    }
    Ok(Arc::new(lens_store::JsonFileHistoryStore::new(path)))
}

/// Run one command against the history at `cli.history`.
pub async fn run<W: Write>(cli: &Cli, analyzer: Arc<dyn Analyzer>, out: &mut W) -> CliResult<()> {
    let store = open_store(&cli.history)?;
    let session = AuditSession::new(analyzer, HistoryManager::open(store).await);

    let result = match &cli.command {
        Command::Audit(args) => audit(&session, args, out).await,
        Command::History => list_history(session.history(), out).await,
        Command::Show { id } => show(&session, id, out).await,
        Command::Delete { id } => delete(&session, id, out).await,
        Command::Clear { yes } => clear(&session, *yes, out).await,
        Command::Trend(args) => trend(session.history(), args, out).await,
        Command::Export { out_dir } => export(&session, out_dir, out).await,
    };

    if let Some(e) = session.history().take_persist_error() {
        writeln!(out, "warning: history could not be saved: {}", e)?;
    }
    result
}

async fn audit<W: Write>(session: &AuditSession, args: &AuditArgs, out: &mut W) -> CliResult<()> {
    if args.sample {
        session.load_sample().await;
    } else if let Some(ref path) = args.plan_file {
        session.set_plan(tokio::fs::read_to_string(path).await?).await;
    } else if let Some(ref plan) = args.plan {
        session.set_plan(plan.clone()).await;
    }
    if let Some(ref name) = args.name {
        session.set_project_name(name.clone()).await;
    }

    match session.submit().await {
        SubmitOutcome::Completed(record) => {
            writeln!(out, "Recorded audit {}", record.id)?;
            render_record(&record, out)?;
            Ok(())
        }
        SubmitOutcome::Failed(message) => Err(CliError::AuditFailed(message)),
        SubmitOutcome::Skipped => {
            writeln!(out, "Plan is empty, nothing to audit.")?;
            Ok(())
        }
        SubmitOutcome::Busy => Err(CliError::Usage(
            "another audit is already running".to_string(),
        )),
    }
}

async fn list_history<W: Write>(history: &HistoryManager, out: &mut W) -> CliResult<()> {
    let records = history.newest_first().await;
    if records.is_empty() {
        writeln!(out, "No audits yet.")?;
        return Ok(());
    }
    let exporter = CsvExporter::local();
    for record in &records {
        writeln!(
            out,
            "{}  {:<6}  {}  {}",
            record.id,
            record.risk_level,
            exporter.format_date(record.timestamp),
            record.project_name
        )?;
    }
    Ok(())
}

async fn show<W: Write>(session: &AuditSession, id: &str, out: &mut W) -> CliResult<()> {
    match session.select(id).await {
        SelectOutcome::Selected(record) => {
            render_record(&record, out)?;
            writeln!(out)?;
            writeln!(out, "Plan:")?;
            for line in record.plan.lines() {
                writeln!(out, "  {}", line)?;
            }
        }
        SelectOutcome::NotFound => writeln!(out, "No audit with id {}.", id)?,
        SelectOutcome::Busy => writeln!(out, "An audit is running, try again later.")?,
    }
    Ok(())
}

async fn delete<W: Write>(session: &AuditSession, id: &str, out: &mut W) -> CliResult<()> {
    let before = session.history().len().await;
    let remaining = session.delete(id).await;
    if remaining.len() < before {
        writeln!(out, "Deleted audit {} ({} left).", id, remaining.len())?;
    } else {
        writeln!(out, "No audit with id {}.", id)?;
    }
    Ok(())
}

async fn clear<W: Write>(session: &AuditSession, yes: bool, out: &mut W) -> CliResult<()> {
    if !yes {
        return Err(CliError::Usage(
            "clearing the entire audit history cannot be undone, pass --yes to confirm"
                .to_string(),
        ));
    }
    session.clear_history().await;
    writeln!(out, "History cleared.")?;
    Ok(())
}

async fn trend<W: Write>(history: &HistoryManager, args: &TrendArgs, out: &mut W) -> CliResult<()> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    let padding_ok = args.padding.is_finite() && args.padding >= 0.0;
    if !positive(args.width) || !positive(args.height) || !padding_ok {
        return Err(CliError::Usage(
            "width and height must be positive and padding non-negative".to_string(),
        ));
    }
    let canvas = Canvas {
        width: args.width,
        height: args.height,
        padding: args.padding,
    };
    let records = history.records().await;
    let series = project(&records, &canvas);

    match &series {
        TrendSeries::Empty => {
            writeln!(out, "Perform more audits to see risk trends over time.")?;
            return Ok(());
        }
        TrendSeries::Single(p) => {
            writeln!(out, "Add at least 2 audits to view the trend line.")?;
            writeln!(out, "Current project: {}", p.record.project_name)?;
        }
        TrendSeries::Line { .. } => {
            for grid in canvas.gridlines() {
                writeln!(out, "{:>4}  y={}", grid.label, grid.y)?;
            }
        }
    }

    writeln!(out, "Audit sequence (oldest to newest):")?;
    for (i, p) in series.points().iter().enumerate() {
        writeln!(out, "{:>3}. x={} y={}  {}", i + 1, p.x, p.y, p.label())?;
    }
    if let (Some(line), Some(area)) = (series.line_path(), series.area_path()) {
        writeln!(out, "line: {}", line)?;
        writeln!(out, "area: {}", area)?;
    }
    Ok(())
}

async fn export<W: Write>(session: &AuditSession, out_dir: &Path, out: &mut W) -> CliResult<()> {
    let sink = DirectorySink::new(out_dir);
    match session.export_to(&sink, &CsvExporter::local()).await {
        Ok(path) => writeln!(out, "Exported history to {}", path.display())?,
        Err(ExportError::NothingToExport) => writeln!(out, "No history to export.")?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn render_record<W: Write>(record: &AuditRecord, out: &mut W) -> CliResult<()> {
    let report = &record.report;
    writeln!(out, "Project: {}", record.project_name)?;
    writeln!(out, "Risk:    {}", record.risk_level)?;
    writeln!(out, "Why:     {}", report.risk_justification)?;
    if report.top_risks.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Top risks:")?;
    for (i, risk) in report.top_risks.iter().enumerate() {
        writeln!(out, "  {}. [{}] {}", i + 1, risk.severity, risk.name)?;
        writeln!(out, "     {}", risk.why)?;
        if !risk.reference.is_empty() {
            writeln!(out, "     > \"{}\"", risk.reference)?;
        }
        for suggestion in report.suggestions_for(&risk.name) {
            writeln!(out, "     Fix now: {}", suggestion.action)?;
        }
    }
    Ok(())
}
