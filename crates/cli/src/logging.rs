//! Log channel setup
//!
//! Operational logs go to stderr as JSON, filtered by `RUST_LOG`.
//! The sync audit target is split off into its own plain-text channel,
//! written to the configured audit file or to stderr.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use sync_lib::observability::AUDIT_TARGET;
use tracing::Level;
use tracing_subscriber::filter::{filter_fn, Targets};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(audit_log_path: Option<&Path>, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let operational = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter)
        .with_filter(filter_fn(|meta| meta.target() != AUDIT_TARGET));

    let audit_writer = match audit_log_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory {:?}", parent))?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open audit log {:?}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let audit = fmt::layer()
        .with_writer(audit_writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::INFO));

    tracing_subscriber::registry()
        .with(operational)
        .with(audit)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
