//! Argument definitions.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "projectlens", version, about = "Audit project plans for early risk signals")]
pub struct Cli {
    /// History file (`.db`/`.sqlite` selects SQLite when built with the `sqlite` feature)
    #[arg(
        long,
        env = "LENS_HISTORY_PATH",
        default_value = "projectlens_history.json",
        global = true
    )]
    pub history: PathBuf,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a plan and record the result
    Audit(AuditArgs),
    /// List past audits, newest first
    History,
    /// Show a past audit
    Show { id: String },
    /// Delete a past audit
    Delete { id: String },
    /// Delete every past audit
    Clear {
        /// Confirm; history cannot be restored
        #[arg(long)]
        yes: bool,
    },
    /// Plot risk levels over the audit sequence
    Trend(TrendArgs),
    /// Write the full history as CSV
    Export {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["plan", "plan_file", "sample"])
))]
pub struct AuditArgs {
    /// Plan text
    #[arg(long)]
    pub plan: Option<String>,
    /// Read the plan from a file
    #[arg(long)]
    pub plan_file: Option<PathBuf>,
    /// Use the built-in sample plan
    #[arg(long)]
    pub sample: bool,
    /// Project name; defaults to the name the analysis suggests
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,
    #[arg(long, default_value_t = 200.0)]
    pub height: f64,
    #[arg(long, default_value_t = 40.0)]
    pub padding: f64,
}
