//! Store abstractions consumed by the engine.
//!
//! Site configurations and stakeholder mappings live in an external store
//! owned by the operator tooling. The engine only reads them:
//!
//! - `SiteConfigStore`: every configured site, in store order
//! - `StakeholderMappingStore`: active mappings for one site, any order
//!
//! A processing run reads the site list once and treats it as a snapshot.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{SiteConfig, StakeholderMapping};

// Re-export for convenience
pub use memory::MemoryStore;

/// Read access to per-domain site configuration.
#[async_trait]
pub trait SiteConfigStore: Send + Sync {
    /// List all site configurations in store order.
    async fn list_site_configurations(&self) -> Result<Vec<SiteConfig>>;
}

/// Read access to stakeholder routing rules.
#[async_trait]
pub trait StakeholderMappingStore: Send + Sync {
    /// List the active mappings of one site. Order is unspecified.
    async fn list_stakeholder_mappings(&self, site_id: &str) -> Result<Vec<StakeholderMapping>>;
}
