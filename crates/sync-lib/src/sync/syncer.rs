//! Per-store incremental batch sync
//!
//! Stores are processed one at a time in enumeration order, batches within
//! a store one at a time. A store moves through
//! `Disabled` | `Enabled -> ConfigFailed` | `Enabled -> Syncing -> Completed`,
//! and only `Completed` records a watermark.

use super::session::FetchSession;
use crate::catalog::ProductSource;
use crate::models::{RemoteClientConfig, Scope, Store, SyncFilter};
use crate::observability::{AuditLog, SyncMetrics, TracingAuditLog};
use crate::remote::RemoteSyncClient;
use crate::settings::{ConfigProvider, StoreEnumerator};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parameters of one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Batch size override; `None` or zero uses each store's setting
    pub batch_size: Option<usize>,
    /// Ignore watermarks and pull the full catalog
    pub force: bool,
}

/// Source of the watermark timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to whole seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now)
    }
}

/// Per-batch outcome counts for one store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub submitted: usize,
    pub failed: usize,
    pub empty: usize,
}

impl BatchTally {
    pub fn total(&self) -> usize {
        self.submitted + self.failed + self.empty
    }
}

/// Result of syncing a single store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Sync disabled for the store
    Skipped,
    /// Remote configuration invalid; watermark untouched
    ConfigFailed { reason: String },
    /// Batch pass finished and the watermark was recorded
    Completed {
        watermark: DateTime<Utc>,
        batches: BatchTally,
    },
}

/// Pushes catalog products for every enabled store to the remote API
pub struct IncrementalBatchSyncer {
    stores: Arc<dyn StoreEnumerator>,
    config: Arc<dyn ConfigProvider>,
    products: Arc<dyn ProductSource>,
    remote: Arc<dyn RemoteSyncClient>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
    metrics: SyncMetrics,
}

impl IncrementalBatchSyncer {
    pub fn builder() -> IncrementalBatchSyncerBuilder {
        IncrementalBatchSyncerBuilder::new()
    }

    /// Sync every store in enumeration order
    ///
    /// Disabled stores and stores with invalid remote configuration are
    /// skipped; batch failures are logged and do not stop a store. Any
    /// other error aborts the run.
    pub async fn run(&self, options: SyncOptions) -> Result<()> {
        let stores = self
            .stores
            .list_stores()
            .await
            .context("Failed to list stores")?;

        info!(
            stores = stores.len(),
            batch_size = ?options.batch_size,
            force = options.force,
            "Starting product sync"
        );

        for store in &stores {
            let outcome = self.sync_store(store, options).await?;
            debug!(store = %store.code, outcome = ?outcome, "Store processed");
        }

        info!(stores = stores.len(), "Product sync finished");
        Ok(())
    }

    /// Sync a single store and report how it ended
    pub async fn sync_store(&self, store: &Store, options: SyncOptions) -> Result<StoreOutcome> {
        let scope = Scope::Store(store.id);

        if !self.config.is_enabled(scope).await? {
            self.audit.store_disabled(store);
            self.metrics.inc_stores_skipped();
            return Ok(StoreOutcome::Skipped);
        }

        self.audit.store_started(store);

        let remote_config = self.remote_config(scope).await?;
        if let Err(err) = self.remote.configure(&remote_config).await {
            warn!(store = %store.code, error = %err, "Invalid products API configuration");
            self.audit.config_rejected(store, &err);
            self.metrics.inc_config_failures();
            return Ok(StoreOutcome::ConfigFailed {
                reason: err.to_string(),
            });
        }

        let batch_size = match options.batch_size {
            Some(size) if size > 0 => size,
            _ => self.config.batch_size(scope).await?,
        };

        let current_date = self.clock.now();
        let filter = match self.config.last_sync(scope).await? {
            Some(since) if !options.force => SyncFilter::since(store.id, since),
            _ => SyncFilter::full(store.id),
        };

        let mut session = FetchSession::open(self.products.as_ref(), filter, batch_size).await?;
        info!(
            store = %store.code,
            since = ?session.filter().updated_since,
            batch_size,
            total_batches = session.total_batches(),
            "Syncing store products"
        );

        let mut tally = BatchTally::default();
        while let Some((batch, products)) = session.next_batch().await? {
            if products.is_empty() {
                self.audit.batch_empty(store, batch);
                self.metrics.inc_batches_empty();
                tally.empty += 1;
                continue;
            }

            match self.remote.submit_batch(&products, batch).await {
                Ok(()) => {
                    self.audit.batch_submitted(store, batch, products.len());
                    self.metrics.record_batch_submitted(products.len());
                    tally.submitted += 1;
                }
                Err(err) => {
                    self.audit.batch_failed(store, batch, &err.to_string());
                    self.metrics.inc_batches_failed();
                    tally.failed += 1;
                }
            }
        }

        self.record_watermark(current_date, scope).await?;
        self.audit.store_finished(store, current_date);
        self.metrics.inc_stores_completed();

        info!(
            store = %store.code,
            submitted = tally.submitted,
            failed = tally.failed,
            empty = tally.empty,
            "Store sync completed"
        );

        Ok(StoreOutcome::Completed {
            watermark: current_date,
            batches: tally,
        })
    }

    async fn remote_config(&self, scope: Scope) -> Result<RemoteClientConfig> {
        Ok(RemoteClientConfig {
            api_url: self.config.api_url(scope).await?,
            api_store_id: self.config.api_store_id(scope).await?,
            api_key: self.config.api_key(scope).await?,
        })
    }

    /// Store-scope watermark plus the default-scope fallback
    async fn record_watermark(&self, at: DateTime<Utc>, scope: Scope) -> Result<()> {
        self.config.set_last_sync(at, scope).await?;
        self.config.set_last_sync(at, Scope::Default).await?;
        self.metrics.set_last_sync(at);
        Ok(())
    }
}

/// Builder for [`IncrementalBatchSyncer`]
pub struct IncrementalBatchSyncerBuilder {
    stores: Option<Arc<dyn StoreEnumerator>>,
    config: Option<Arc<dyn ConfigProvider>>,
    products: Option<Arc<dyn ProductSource>>,
    remote: Option<Arc<dyn RemoteSyncClient>>,
    audit: Option<Arc<dyn AuditLog>>,
    clock: Option<Arc<dyn Clock>>,
}

impl IncrementalBatchSyncerBuilder {
    pub fn new() -> Self {
        Self {
            stores: None,
            config: None,
            products: None,
            remote: None,
            audit: None,
            clock: None,
        }
    }

    pub fn stores(mut self, stores: Arc<dyn StoreEnumerator>) -> Self {
        self.stores = Some(stores);
        self
    }

    pub fn config(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn products(mut self, products: Arc<dyn ProductSource>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn remote(mut self, remote: Arc<dyn RemoteSyncClient>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<IncrementalBatchSyncer> {
        let stores = self
            .stores
            .ok_or_else(|| anyhow::anyhow!("store enumerator is required"))?;
        let config = self
            .config
            .ok_or_else(|| anyhow::anyhow!("config provider is required"))?;
        let products = self
            .products
            .ok_or_else(|| anyhow::anyhow!("product source is required"))?;
        let remote = self
            .remote
            .ok_or_else(|| anyhow::anyhow!("remote client is required"))?;

        Ok(IncrementalBatchSyncer {
            stores,
            config,
            products,
            remote,
            audit: self
                .audit
                .unwrap_or_else(|| Arc::new(TracingAuditLog::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            metrics: SyncMetrics::new(),
        })
    }
}

impl Default for IncrementalBatchSyncerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
