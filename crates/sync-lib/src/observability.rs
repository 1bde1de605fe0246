//! Observability infrastructure for catalog sync
//!
//! Provides:
//! - Prometheus counters for stores and batches (registered once, globally)
//! - The sync audit log, a channel separate from operational tracing

use crate::models::Store;
use crate::remote::ConfigError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Tracing target of the audit channel
pub const AUDIT_TARGET: &str = "catalog_sync::audit";

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SyncMetricsInner> = OnceLock::new();

struct SyncMetricsInner {
    stores_completed: IntCounter,
    stores_skipped: IntCounter,
    config_failures: IntCounter,
    batches_submitted: IntCounter,
    batches_failed: IntCounter,
    batches_empty: IntCounter,
    products_submitted: IntCounter,
    last_sync_timestamp: IntGauge,
}

impl SyncMetricsInner {
    fn new() -> Self {
        Self {
            stores_completed: register_int_counter!(
                "catalog_sync_stores_completed_total",
                "Stores whose batch pass completed and advanced the watermark"
            )
            .expect("Failed to register stores_completed"),

            stores_skipped: register_int_counter!(
                "catalog_sync_stores_skipped_total",
                "Stores skipped because sync is disabled"
            )
            .expect("Failed to register stores_skipped"),

            config_failures: register_int_counter!(
                "catalog_sync_config_failures_total",
                "Stores skipped because remote configuration was invalid"
            )
            .expect("Failed to register config_failures"),

            batches_submitted: register_int_counter!(
                "catalog_sync_batches_submitted_total",
                "Product batches accepted by the remote API"
            )
            .expect("Failed to register batches_submitted"),

            batches_failed: register_int_counter!(
                "catalog_sync_batches_failed_total",
                "Product batches rejected by or not delivered to the remote API"
            )
            .expect("Failed to register batches_failed"),

            batches_empty: register_int_counter!(
                "catalog_sync_batches_empty_total",
                "Batches with nothing to sync"
            )
            .expect("Failed to register batches_empty"),

            products_submitted: register_int_counter!(
                "catalog_sync_products_submitted_total",
                "Products in accepted batches"
            )
            .expect("Failed to register products_submitted"),

            last_sync_timestamp: register_int_gauge!(
                "catalog_sync_last_sync_timestamp_seconds",
                "Unix time of the most recently recorded watermark"
            )
            .expect("Failed to register last_sync_timestamp"),
        }
    }
}

/// Sync metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SyncMetrics {
    _private: (),
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SyncMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SyncMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn inc_stores_completed(&self) {
        self.inner().stores_completed.inc();
    }

    pub fn inc_stores_skipped(&self) {
        self.inner().stores_skipped.inc();
    }

    pub fn inc_config_failures(&self) {
        self.inner().config_failures.inc();
    }

    /// Record an accepted batch of `products` items
    pub fn record_batch_submitted(&self, products: usize) {
        self.inner().batches_submitted.inc();
        self.inner().products_submitted.inc_by(products as u64);
    }

    pub fn inc_batches_failed(&self) {
        self.inner().batches_failed.inc();
    }

    pub fn inc_batches_empty(&self) {
        self.inner().batches_empty.inc();
    }

    pub fn set_last_sync(&self, at: DateTime<Utc>) {
        self.inner().last_sync_timestamp.set(at.timestamp());
    }

    #[cfg(test)]
    pub(crate) fn batches_submitted(&self) -> u64 {
        self.inner().batches_submitted.get()
    }

    /// Render all registered metrics in Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&prometheus::gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics are not valid UTF-8")
    }
}

/// Audit channel for sync progress
///
/// Records store start and finish, per-batch outcomes, and skip or
/// error reasons. Kept separate from operational logging so it can be
/// routed and retained on its own.
pub trait AuditLog: Send + Sync {
    /// Store skipped because sync is disabled for it
    fn store_disabled(&self, store: &Store);

    fn store_started(&self, store: &Store);

    /// Remote configuration rejected; the store is skipped
    fn config_rejected(&self, store: &Store, error: &ConfigError);

    fn batch_submitted(&self, store: &Store, batch: usize, products: usize);

    fn batch_failed(&self, store: &Store, batch: usize, message: &str);

    /// Nothing to sync in this batch
    fn batch_empty(&self, store: &Store, batch: usize);

    fn store_finished(&self, store: &Store, watermark: DateTime<Utc>);
}

/// [`AuditLog`] that emits structured events on [`AUDIT_TARGET`]
#[derive(Clone, Default)]
pub struct TracingAuditLog;

impl TracingAuditLog {
    pub fn new() -> Self {
        Self
    }
}

impl AuditLog for TracingAuditLog {
    fn store_disabled(&self, store: &Store) {
        info!(
            target: AUDIT_TARGET,
            event = "store_disabled",
            store_id = store.id,
            store = %store.code,
            "Sync disabled for {} store, skipping",
            store.code
        );
    }

    fn store_started(&self, store: &Store) {
        info!(
            target: AUDIT_TARGET,
            event = "store_started",
            store_id = store.id,
            store = %store.code,
            "Start sync products for {} store",
            store.code
        );
    }

    fn config_rejected(&self, store: &Store, error: &ConfigError) {
        error!(
            target: AUDIT_TARGET,
            event = "config_rejected",
            store_id = store.id,
            store = %store.code,
            error = %error,
            "{}",
            error
        );
    }

    fn batch_submitted(&self, store: &Store, batch: usize, products: usize) {
        info!(
            target: AUDIT_TARGET,
            event = "batch_submitted",
            store_id = store.id,
            store = %store.code,
            batch,
            products,
            "Products batch {} synced",
            batch
        );
    }

    fn batch_failed(&self, store: &Store, batch: usize, message: &str) {
        warn!(
            target: AUDIT_TARGET,
            event = "batch_failed",
            store_id = store.id,
            store = %store.code,
            batch,
            error = %message,
            "Error found in products batch {}. {}",
            batch,
            message
        );
    }

    fn batch_empty(&self, store: &Store, batch: usize) {
        info!(
            target: AUDIT_TARGET,
            event = "batch_empty",
            store_id = store.id,
            store = %store.code,
            batch,
            "Nothing to sync in batch {}",
            batch
        );
    }

    fn store_finished(&self, store: &Store, watermark: DateTime<Utc>) {
        info!(
            target: AUDIT_TARGET,
            event = "store_finished",
            store_id = store.id,
            store = %store.code,
            watermark = %watermark.to_rfc3339(),
            "Finish sync products for {} store",
            store.code
        );
    }
}
