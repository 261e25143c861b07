//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{SiteConfig, StakeholderMapping};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Classification thresholds and fallback recipients
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Alert dispatch behavior
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Ordered header-detection table
    #[serde(default = "defaults::columns")]
    pub columns: Vec<ColumnRule>,

    /// Site definitions seeding the in-memory store
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// Stakeholder mappings seeding the in-memory store
    #[serde(default)]
    pub mappings: Vec<StakeholderMapping>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(AppError::validation("columns table is empty"));
        }
        if !self.columns.iter().any(|c| c.role == ColumnRole::Url) {
            return Err(AppError::validation("columns table has no url role"));
        }
        if let Some(rule) = self.columns.iter().find(|c| c.synonyms.is_empty()) {
            return Err(AppError::validation(format!(
                "columns.{} has no synonyms",
                rule.role
            )));
        }
        if self.processing.unmatched_site_stakeholder.trim().is_empty() {
            return Err(AppError::validation(
                "processing.unmatched_site_stakeholder is empty",
            ));
        }
        if self.processing.lookup_failure_stakeholder.trim().is_empty() {
            return Err(AppError::validation(
                "processing.lookup_failure_stakeholder is empty",
            ));
        }
        if self.processing.default_expiry_days < 0 {
            return Err(AppError::validation(
                "processing.default_expiry_days must be >= 0",
            ));
        }
        if self.alerts.fallback_recipient.trim().is_empty() {
            return Err(AppError::validation("alerts.fallback_recipient is empty"));
        }

        let site_ids: HashSet<&str> = self.sites.iter().map(|s| s.id.as_str()).collect();
        for site in &self.sites {
            if site.expiry_days < 0 {
                return Err(AppError::validation(format!(
                    "site {} has negative expiry_days",
                    site.domain
                )));
            }
        }
        if let Some(orphan) = self
            .mappings
            .iter()
            .find(|m| !site_ids.contains(m.site_id.as_str()))
        {
            return Err(AppError::validation(format!(
                "mapping {} refers to unknown site {}",
                orphan.pattern, orphan.site_id
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            alerts: AlertConfig::default(),
            columns: defaults::columns(),
            sites: Vec::new(),
            mappings: Vec::new(),
        }
    }
}

/// Thresholds applied when no site matches, and stakeholder fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Expiry threshold for pages on unconfigured domains
    #[serde(default = "defaults::expiry_days")]
    pub default_expiry_days: i64,

    /// Engagement threshold for pages on unconfigured domains
    #[serde(default = "defaults::engagement_threshold")]
    pub default_engagement_threshold: u64,

    /// Pages no older than this are never low-engagement
    #[serde(default = "defaults::grace_period_days")]
    pub grace_period_days: i64,

    /// Recipient for pages whose domain matches no site
    #[serde(default = "defaults::unmatched_site_stakeholder")]
    pub unmatched_site_stakeholder: String,

    /// Recipient used when the mapping store cannot be reached
    #[serde(default = "defaults::lookup_failure_stakeholder")]
    pub lookup_failure_stakeholder: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: defaults::expiry_days(),
            default_engagement_threshold: defaults::engagement_threshold(),
            grace_period_days: defaults::grace_period_days(),
            unmatched_site_stakeholder: defaults::unmatched_site_stakeholder(),
            lookup_failure_stakeholder: defaults::lookup_failure_stakeholder(),
        }
    }
}

/// Alert dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Delay between consecutive sends in milliseconds
    #[serde(default = "defaults::send_delay")]
    pub send_delay_ms: u64,

    /// Recipient for pages without a resolved stakeholder
    #[serde(default = "defaults::fallback_recipient")]
    pub fallback_recipient: String,
}

impl AlertConfig {
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: defaults::send_delay(),
            fallback_recipient: defaults::fallback_recipient(),
        }
    }
}

/// Column role recognised in the header row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Url,
    Title,
    Created,
    Updated,
    Views,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnRole::Url => "url",
            ColumnRole::Title => "title",
            ColumnRole::Created => "created",
            ColumnRole::Updated => "updated",
            ColumnRole::Views => "views",
        };
        f.write_str(name)
    }
}

/// A header is assigned `role` when it contains any of `synonyms`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnRule {
    pub role: ColumnRole,
    pub synonyms: Vec<String>,
}

impl ColumnRule {
    pub fn new(role: ColumnRole, synonyms: &[&str]) -> Self {
        Self {
            role,
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

mod defaults {
    use super::{ColumnRole, ColumnRule};

    pub fn expiry_days() -> i64 {
        730
    }
    pub fn engagement_threshold() -> u64 {
        5
    }
    pub fn grace_period_days() -> i64 {
        30
    }
    pub fn unmatched_site_stakeholder() -> String {
        "corporate-web@example.com".into()
    }
    pub fn lookup_failure_stakeholder() -> String {
        "webmaster@example.com".into()
    }

    pub fn send_delay() -> u64 {
        100
    }
    pub fn fallback_recipient() -> String {
        "webmaster@example.com".into()
    }

    pub fn columns() -> Vec<ColumnRule> {
        vec![
            ColumnRule::new(ColumnRole::Url, &["url", "page"]),
            ColumnRule::new(ColumnRole::Title, &["title", "name"]),
            ColumnRule::new(ColumnRole::Created, &["created", "date"]),
            ColumnRule::new(ColumnRole::Updated, &["updated", "modified"]),
            ColumnRule::new(ColumnRole::Views, &["view", "traffic", "visit"]),
        ]
    }
}
