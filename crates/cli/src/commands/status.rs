//! Show per-store sync settings and watermarks

use anyhow::Result;
use serde::Serialize;
use sync_lib::settings::{ConfigProvider, FileConfigProvider, StoreEnumerator, SyncSettings};
use sync_lib::Scope;
use tabled::Tabled;

use crate::output::{color_status, format_watermark, print_info, print_table, OutputFormat};

/// Row for the status table
#[derive(Tabled, Serialize)]
struct StoreStatusRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Store")]
    code: String,
    #[tabled(rename = "Sync")]
    #[serde(skip)]
    status: String,
    #[tabled(skip)]
    enabled: bool,
    #[tabled(rename = "Batch Size")]
    batch_size: usize,
    #[tabled(rename = "Last Sync")]
    last_sync: String,
}

pub async fn show_status(settings: SyncSettings, format: OutputFormat) -> Result<()> {
    let provider = FileConfigProvider::new(settings)?;

    let mut rows = Vec::new();
    for store in provider.list_stores().await? {
        let scope = Scope::Store(store.id);
        let enabled = provider.is_enabled(scope).await?;
        let status = if enabled { "enabled" } else { "disabled" };

        rows.push(StoreStatusRow {
            id: store.id,
            code: store.code,
            status: color_status(status),
            enabled,
            batch_size: provider.batch_size(scope).await?,
            last_sync: format_watermark(provider.last_sync(scope).await?),
        });
    }

    print_table(&rows, format);

    if let OutputFormat::Table = format {
        let default_sync = provider.last_sync(Scope::Default).await?;
        print_info(&format!(
            "Default scope last sync: {}",
            format_watermark(default_sync)
        ));
    }

    Ok(())
}
