//! ProjectLens command line.

pub mod cli;
pub mod commands;

pub use cli::{AuditArgs, Cli, Command, TrendArgs};
pub use commands::{open_store, run, CliError};
