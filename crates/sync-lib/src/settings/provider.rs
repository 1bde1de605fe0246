//! File-backed settings and watermark provider

use super::state::WatermarkState;
use super::{ConfigProvider, StoreEnumerator, DEFAULT_BATCH_SIZE};
use crate::models::{Scope, Store, StoreId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "CATALOG_SYNC";

/// Values that may be set at default scope and overridden per store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeValues {
    pub enabled: Option<bool>,
    pub api_url: Option<String>,
    pub api_store_id: Option<String>,
    pub api_key: Option<String>,
    pub batch_size: Option<usize>,
}

/// A configured store with its store-scope overrides
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub id: StoreId,
    pub code: String,
    pub enabled: Option<bool>,
    pub api_url: Option<String>,
    pub api_store_id: Option<String>,
    pub api_key: Option<String>,
    pub batch_size: Option<usize>,
}

impl StoreSettings {
    fn values(&self) -> ScopeValues {
        ScopeValues {
            enabled: self.enabled,
            api_url: self.api_url.clone(),
            api_store_id: self.api_store_id.clone(),
            api_key: self.api_key.clone(),
            batch_size: self.batch_size,
        }
    }
}

/// Settings for a sync deployment
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    /// JSON file holding sync watermarks
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// JSON catalog export to read products from
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Destination of the audit log; stderr when unset
    #[serde(default)]
    pub audit_log_path: Option<PathBuf>,

    /// Products API request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Default-scope values
    #[serde(default)]
    pub defaults: ScopeValues,

    /// Stores in sync order
    #[serde(default)]
    pub stores: Vec<StoreSettings>,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("/var/lib/catalog-sync/state.json")
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.json")
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            catalog_path: default_catalog_path(),
            audit_log_path: None,
            request_timeout_secs: default_request_timeout(),
            defaults: ScopeValues::default(),
            stores: Vec::new(),
        }
    }
}

impl SyncSettings {
    /// Load settings from a TOML file layered with `CATALOG_SYNC__*` variables
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load settings from {:?}", path))?;

        settings.try_deserialize().context("Invalid settings")
    }

    fn store(&self, id: StoreId) -> Option<&StoreSettings> {
        self.stores.iter().find(|s| s.id == id)
    }

    /// Resolve a value at `scope`, falling back to default scope
    fn resolve<T>(&self, scope: Scope, pick: impl Fn(&ScopeValues) -> Option<T>) -> Option<T> {
        let store_value = match scope {
            Scope::Store(id) => self.store(id).and_then(|s| pick(&s.values())),
            Scope::Default => None,
        };
        store_value.or_else(|| pick(&self.defaults))
    }
}

/// [`StoreEnumerator`] and [`ConfigProvider`] over [`SyncSettings`]
/// and a [`WatermarkState`] file
pub struct FileConfigProvider {
    settings: SyncSettings,
    state: RwLock<WatermarkState>,
}

impl FileConfigProvider {
    /// Create a provider, loading existing watermarks from `settings.state_path`
    pub fn new(settings: SyncSettings) -> Result<Self> {
        let state = WatermarkState::load(&settings.state_path)?;
        debug!(
            path = %settings.state_path.display(),
            stores = state.stores.len(),
            "Watermarks loaded"
        );

        Ok(Self {
            settings,
            state: RwLock::new(state),
        })
    }
}

#[async_trait]
impl StoreEnumerator for FileConfigProvider {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        Ok(self
            .settings
            .stores
            .iter()
            .map(|s| Store::new(s.id, s.code.clone()))
            .collect())
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn is_enabled(&self, scope: Scope) -> Result<bool> {
        Ok(self.settings.resolve(scope, |v| v.enabled).unwrap_or(false))
    }

    async fn api_url(&self, scope: Scope) -> Result<String> {
        Ok(self
            .settings
            .resolve(scope, |v| v.api_url.clone())
            .unwrap_or_default())
    }

    async fn api_store_id(&self, scope: Scope) -> Result<String> {
        Ok(self
            .settings
            .resolve(scope, |v| v.api_store_id.clone())
            .unwrap_or_default())
    }

    async fn api_key(&self, scope: Scope) -> Result<String> {
        Ok(self
            .settings
            .resolve(scope, |v| v.api_key.clone())
            .unwrap_or_default())
    }

    async fn batch_size(&self, scope: Scope) -> Result<usize> {
        Ok(self
            .settings
            .resolve(scope, |v| v.batch_size.filter(|n| *n > 0))
            .unwrap_or(DEFAULT_BATCH_SIZE))
    }

    async fn last_sync(&self, scope: Scope) -> Result<Option<DateTime<Utc>>> {
        Ok(self.state.read().await.get(scope))
    }

    async fn set_last_sync(&self, value: DateTime<Utc>, scope: Scope) -> Result<()> {
        let mut state = self.state.write().await;
        state.set(scope, value);
        state
            .save(&self.settings.state_path)
            .with_context(|| format!("Failed to record watermark for {}", scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    const SETTINGS: &str = r#"
catalog_path = "catalog.json"

[defaults]
enabled = true
api_url = "https://api.example.com"
api_store_id = "default-store"
api_key = "default-key"
batch_size = 100

[[stores]]
id = 1
code = "default"
batch_size = 25

[[stores]]
id = 2
code = "outlet"
enabled = false
api_key = "outlet-key"
"#;

    fn write_settings(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("catalog-sync.toml");
        let state_path = dir.path().join("state.json");
        let body = format!("state_path = {:?}\n{}", state_path.display().to_string(), SETTINGS);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_sync_settings_default() {
        let settings = SyncSettings::default();
        assert_eq!(settings.request_timeout_secs, 30);
        assert!(settings.stores.is_empty());
        assert!(settings.audit_log_path.is_none());
    }

    #[tokio::test]
    async fn test_store_scope_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let settings = SyncSettings::load(&write_settings(&dir)).unwrap();
        let provider = FileConfigProvider::new(settings).unwrap();

        assert!(provider.is_enabled(Scope::Store(1)).await.unwrap());
        assert!(!provider.is_enabled(Scope::Store(2)).await.unwrap());
        assert_eq!(provider.batch_size(Scope::Store(1)).await.unwrap(), 25);
        assert_eq!(provider.batch_size(Scope::Store(2)).await.unwrap(), 100);
        assert_eq!(provider.api_key(Scope::Store(1)).await.unwrap(), "default-key");
        assert_eq!(provider.api_key(Scope::Store(2)).await.unwrap(), "outlet-key");
        assert_eq!(
            provider.api_url(Scope::Store(2)).await.unwrap(),
            "https://api.example.com"
        );
    }

    #[tokio::test]
    async fn test_list_stores_in_file_order() {
        let dir = TempDir::new().unwrap();
        let settings = SyncSettings::load(&write_settings(&dir)).unwrap();
        let provider = FileConfigProvider::new(settings).unwrap();

        let stores = provider.list_stores().await.unwrap();
        assert_eq!(stores, vec![Store::new(1, "default"), Store::new(2, "outlet")]);
    }

    #[tokio::test]
    async fn test_unset_values_use_builtin_defaults() {
        let dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(SyncSettings {
            state_path: dir.path().join("state.json"),
            ..SyncSettings::default()
        })
        .unwrap();

        assert!(!provider.is_enabled(Scope::Default).await.unwrap());
        assert_eq!(provider.api_url(Scope::Store(9)).await.unwrap(), "");
        assert_eq!(
            provider.batch_size(Scope::Store(9)).await.unwrap(),
            DEFAULT_BATCH_SIZE
        );
        assert!(provider.last_sync(Scope::Store(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_watermark_survives_reload() {
        let dir = TempDir::new().unwrap();
        let settings_path = write_settings(&dir);
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        {
            let provider =
                FileConfigProvider::new(SyncSettings::load(&settings_path).unwrap()).unwrap();
            provider.set_last_sync(ts, Scope::Store(1)).await.unwrap();
            provider.set_last_sync(ts, Scope::Default).await.unwrap();
        }

        let provider = FileConfigProvider::new(SyncSettings::load(&settings_path).unwrap()).unwrap();
        assert_eq!(provider.last_sync(Scope::Store(1)).await.unwrap(), Some(ts));
        assert_eq!(provider.last_sync(Scope::Default).await.unwrap(), Some(ts));
        assert_eq!(provider.last_sync(Scope::Store(2)).await.unwrap(), Some(ts));
    }

    #[tokio::test]
    async fn test_store_watermark_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(SyncSettings::load(&write_settings(&dir)).unwrap())
            .unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        assert_eq!(provider.last_sync(Scope::Store(1)).await.unwrap(), None);
        provider.set_last_sync(ts, Scope::Default).await.unwrap();

        assert_eq!(provider.last_sync(Scope::Store(1)).await.unwrap(), Some(ts));
        assert_eq!(
            provider.batch_size(Scope::Store(2)).await.unwrap(),
            provider.batch_size(Scope::Default).await.unwrap()
        );
    }
}
