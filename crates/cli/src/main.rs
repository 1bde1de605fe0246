//! Catalog Sync CLI
//!
//! Runs the incremental product sync for every configured store and
//! inspects its settings and watermarks.

mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{run, status, validate};
use std::path::PathBuf;
use sync_lib::settings::SyncSettings;
use sync_lib::sync::SyncOptions;
use tracing::info;

/// Catalog Sync CLI
#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(author, version, about = "Catalog Sync: push catalog products to the warranty products API", long_about = None)]
pub struct Cli {
    /// Settings file (can also be set via CATALOG_SYNC_CONFIG env var)
    #[arg(long, short, env = "CATALOG_SYNC_CONFIG", default_value = "catalog-sync.toml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync products updated since the last run for every enabled store
    Run {
        /// Products per batch, overriding each store's setting
        #[arg(long)]
        batch_size: Option<usize>,

        /// Ignore watermarks and resync the full catalog
        #[arg(long)]
        force: bool,

        /// Write Prometheus metrics to this file after the run
        #[arg(long)]
        metrics_file: Option<PathBuf>,
    },

    /// Show sync settings and last sync time per store
    Status,

    /// Check remote API settings for every enabled store
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = SyncSettings::load(&cli.config)?;
    logging::init(settings.audit_log_path.as_deref(), cli.verbose)?;
    info!(
        config = %cli.config.display(),
        stores = settings.stores.len(),
        "Settings loaded"
    );

    match cli.command {
        Commands::Run {
            batch_size,
            force,
            metrics_file,
        } => {
            let options = SyncOptions { batch_size, force };
            run::run_sync(settings, options, metrics_file.as_deref()).await?;
        }
        Commands::Status => {
            status::show_status(settings, cli.format).await?;
        }
        Commands::Validate => {
            validate::validate_stores(settings, cli.format).await?;
        }
    }

    Ok(())
}
