//! Store enumeration and scoped sync settings
//!
//! This module provides:
//! - The [`StoreEnumerator`] and [`ConfigProvider`] seams used by the syncer
//! - TOML/environment settings loading via the `config` crate
//! - A JSON state file holding per-scope sync watermarks
//! - [`FileConfigProvider`], which combines the two

mod provider;
mod state;

pub use provider::{FileConfigProvider, ScopeValues, StoreSettings, SyncSettings, ENV_PREFIX};
pub use state::WatermarkState;

use crate::models::{Scope, Store};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Batch size used when no scope configures one
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Lists the stores to synchronize
#[async_trait]
pub trait StoreEnumerator: Send + Sync {
    /// Stores in enumeration order
    async fn list_stores(&self) -> Result<Vec<Store>>;
}

/// Scoped sync configuration and watermark storage
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn is_enabled(&self, scope: Scope) -> Result<bool>;

    async fn api_url(&self, scope: Scope) -> Result<String>;

    async fn api_store_id(&self, scope: Scope) -> Result<String>;

    async fn api_key(&self, scope: Scope) -> Result<String>;

    async fn batch_size(&self, scope: Scope) -> Result<usize>;

    /// Last recorded sync timestamp for the scope, if any
    async fn last_sync(&self, scope: Scope) -> Result<Option<DateTime<Utc>>>;

    async fn set_last_sync(&self, value: DateTime<Utc>, scope: Scope) -> Result<()>;
}
