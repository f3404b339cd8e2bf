//! prag-ingest - Pragmaticon corpus ingest
//!
//! Reads the corpus CSV named on the command line, rebuilds the database
//! tables from it and writes a per-column frequency report.

use anyhow::Result;
use clap::Parser;
use prag_common::config::{CliOverrides, IngestConfig};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "prag-ingest",
    version,
    about = "Load the Pragmaticon corpus CSV into the database"
)]
struct Args {
    /// Path to the corpus CSV file
    input: PathBuf,

    /// TOML config file [env: PRAG_CONFIG]
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database file (recreated on every run) [env: PRAG_DATABASE]
    #[arg(long)]
    database: Option<PathBuf>,

    /// Frequency report output file [env: PRAG_REPORT]
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log filter directive, takes precedence over RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Register example excerpts not already known as translations
    #[arg(long)]
    register_examples: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            database: self.database.clone(),
            report: self.report.clone(),
            log_level: self.log_level.clone(),
            register_examples: self.register_examples,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = IngestConfig::resolve(&args.overrides())?;

    // log_level already folds in --log-level > RUST_LOG > config file
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    info!("Starting prag-ingest v{}", env!("CARGO_PKG_VERSION"));
    match &config.config_file {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    info!("Database: {}", config.database.display());

    match prag_ingest::run(&config, &args.input).await {
        Ok(summary) => {
            info!("Processed {} rows, {} issues", summary.rows, summary.issues());
            Ok(())
        }
        Err(e) => {
            error!("Ingest failed: {}", e);
            Err(e.into())
        }
    }
}
