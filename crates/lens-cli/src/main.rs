//! ProjectLens CLI: audit plans, browse history, trends, CSV export.

use clap::Parser;
use lens_analyze::{OpenAiAnalyzer, UnavailableAnalyzer};
use lens_cli::Cli;
use lens_types::{AnalyzeError, Analyzer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let analyzer: Arc<dyn Analyzer> = match OpenAiAnalyzer::from_env() {
        Ok(analyzer) => {
            tracing::debug!(model = analyzer.model(), "analysis client configured");
            Arc::new(analyzer)
        }
        Err(AnalyzeError::Config(reason)) => Arc::new(UnavailableAnalyzer::new(reason)),
        Err(e) => Arc::new(UnavailableAnalyzer::new(e.to_string())),
    };

    let mut stdout = std::io::stdout().lock();
    lens_cli::run(&cli, analyzer, &mut stdout).await?;
    Ok(())
}
