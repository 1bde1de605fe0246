//! Watermark state persisted between runs

use crate::models::{Scope, StoreId};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Last sync timestamps at default and store scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatermarkState {
    #[serde(default)]
    pub default: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stores: BTreeMap<StoreId, DateTime<Utc>>,
}

impl WatermarkState {
    /// Watermark for a scope. A store without its own entry falls back to
    /// the default scope, like every other scoped setting.
    pub fn get(&self, scope: Scope) -> Option<DateTime<Utc>> {
        match scope {
            Scope::Default => self.default,
            Scope::Store(id) => self.stores.get(&id).copied().or(self.default),
        }
    }

    pub fn set(&mut self, scope: Scope, value: DateTime<Utc>) {
        match scope {
            Scope::Default => self.default = Some(value),
            Scope::Store(id) => {
                self.stores.insert(id, value);
            }
        }
    }

    /// Load state, treating a missing file as empty
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read state file {:?}", path))?;
        serde_json::from_slice(&data).context("Failed to parse state file")
    }

    /// Save state atomically via a temp file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let json = serde_json::to_vec_pretty(self).context("Failed to serialize state")?;

        let temp_path = path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;
        file.write_all(&json).context("Failed to write state data")?;
        file.sync_all().context("Failed to sync state file")?;

        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;

        debug!(path = %path.display(), stores = self.stores.len(), "State saved");
        Ok(())
    }
}
