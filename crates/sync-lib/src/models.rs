//! Core data models for catalog sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a store in the platform
pub type StoreId = u32;

/// A store (sales channel) as enumerated from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub code: String,
}

impl Store {
    pub fn new(id: StoreId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
        }
    }
}

/// Configuration scope. Store values fall back to the default scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Default,
    Store(StoreId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Default => write!(f, "default"),
            Scope::Store(id) => write!(f, "stores/{}", id),
        }
    }
}

/// Filter applied to a store's product pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFilter {
    pub store_id: StoreId,
    /// Only products updated at or after this instant
    pub updated_since: Option<DateTime<Utc>>,
}

impl SyncFilter {
    /// Full pull for a store
    pub fn full(store_id: StoreId) -> Self {
        Self {
            store_id,
            updated_since: None,
        }
    }

    /// Incremental pull for a store
    pub fn since(store_id: StoreId, updated_since: DateTime<Utc>) -> Self {
        Self {
            store_id,
            updated_since: Some(updated_since),
        }
    }

    pub fn is_incremental(&self) -> bool {
        self.updated_since.is_some()
    }
}

/// Catalog product as exported by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub store_ids: Vec<StoreId>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_type_id")]
    pub type_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_sku: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_type_id() -> String {
    "simple".to_string()
}

/// Remote endpoint settings for one store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteClientConfig {
    pub api_url: String,
    pub api_store_id: String,
    pub api_key: String,
}
