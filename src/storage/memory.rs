//! In-memory store seeded from configuration.
//!
//! Backs the CLI and the test suites. Holds both sites and mappings behind
//! a `RwLock` so mappings can be added or retired between runs.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Config, SiteConfig, StakeholderMapping};
use crate::storage::{SiteConfigStore, StakeholderMappingStore};

#[derive(Debug, Default)]
struct Inner {
    sites: Vec<SiteConfig>,
    mappings: Vec<StakeholderMapping>,
}

/// Site and mapping store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create a store holding the given sites and mappings.
    pub fn new(sites: Vec<SiteConfig>, mappings: Vec<StakeholderMapping>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner { sites, mappings })),
        }
    }

    /// Create a store from the `[[sites]]` and `[[mappings]]` tables of a config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sites.clone(), config.mappings.clone())
    }

    /// Append a mapping.
    pub fn add_mapping(&self, mapping: StakeholderMapping) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.mappings.push(mapping);
        Ok(())
    }

    /// Mark a mapping inactive. Returns whether a mapping with `id` existed.
    pub fn deactivate_mapping(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let mut found = false;
        for mapping in inner.mappings.iter_mut().filter(|m| m.id == id) {
            mapping.is_active = false;
            found = true;
        }
        Ok(found)
    }
}

fn poisoned() -> AppError {
    AppError::store("memory store lock poisoned")
}

#[async_trait]
impl SiteConfigStore for MemoryStore {
    async fn list_site_configurations(&self) -> Result<Vec<SiteConfig>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.sites.clone())
    }
}

#[async_trait]
impl StakeholderMappingStore for MemoryStore {
    async fn list_stakeholder_mappings(&self, site_id: &str) -> Result<Vec<StakeholderMapping>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .mappings
            .iter()
            .filter(|m| m.site_id == site_id && m.is_active)
            .cloned()
            .collect())
    }
}
