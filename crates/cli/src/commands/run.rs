//! One sync pass over all configured stores

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use sync_lib::catalog::CatalogFile;
use sync_lib::remote::{ClientConfig, HttpProductsClient};
use sync_lib::settings::{FileConfigProvider, SyncSettings};
use sync_lib::sync::{IncrementalBatchSyncer, SyncOptions};
use sync_lib::SyncMetrics;
use tracing::info;

use crate::output::{print_info, print_success};

/// Run the incremental sync and optionally export metrics
pub async fn run_sync(
    settings: SyncSettings,
    options: SyncOptions,
    metrics_file: Option<&Path>,
) -> Result<()> {
    let catalog = Arc::new(CatalogFile::load(&settings.catalog_path).await?);
    let remote = Arc::new(HttpProductsClient::new(ClientConfig {
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
        ..ClientConfig::default()
    })?);
    let provider = Arc::new(FileConfigProvider::new(settings)?);

    let syncer = IncrementalBatchSyncer::builder()
        .stores(provider.clone())
        .config(provider.clone())
        .products(catalog)
        .remote(remote)
        .build()?;

    syncer.run(options).await?;

    if let Some(path) = metrics_file {
        let text = SyncMetrics::new().encode_text()?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write metrics to {:?}", path))?;
        info!(path = %path.display(), "Metrics exported");
        print_info(&format!("Metrics written to {}", path.display()));
    }

    print_success("Product sync finished");
    Ok(())
}
