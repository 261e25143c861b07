// src/services/stakeholders.rs

//! Stakeholder resolution.
//!
//! Routes a page (domain + path) to a responsible email:
//! site lookup, then priority-ordered mapping match, then the site default.
//! Store failures never escape; they resolve to the configured failure address.

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{MappingType, ProcessingConfig, SiteConfig, StakeholderMapping};
use crate::storage::{SiteConfigStore, StakeholderMappingStore};

/// Resolves page stakeholders against the configured stores.
///
/// Compiled wildcard patterns are kept for the resolver's lifetime, which is
/// one processing run.
pub struct StakeholderResolver<'a> {
    sites: &'a dyn SiteConfigStore,
    mappings: &'a dyn StakeholderMappingStore,
    unmatched_site: &'a str,
    lookup_failure: &'a str,
    patterns: Mutex<HashMap<String, Regex>>,
}

impl<'a> StakeholderResolver<'a> {
    pub fn new(
        sites: &'a dyn SiteConfigStore,
        mappings: &'a dyn StakeholderMappingStore,
        config: &'a ProcessingConfig,
    ) -> Self {
        Self {
            sites,
            mappings,
            unmatched_site: &config.unmatched_site_stakeholder,
            lookup_failure: &config.lookup_failure_stakeholder,
            patterns: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a stakeholder, reading the current site list from the store.
    pub async fn resolve(&self, domain: &str, path: &str) -> String {
        match self.sites.list_site_configurations().await {
            Ok(sites) => self.resolve_with_sites(&sites, domain, path).await,
            Err(e) => {
                log::warn!("Error finding stakeholder for {domain}{path}: {e}");
                self.lookup_failure.to_string()
            }
        }
    }

    /// Resolve a stakeholder against an already-fetched site snapshot.
    pub async fn resolve_with_sites(
        &self,
        sites: &[SiteConfig],
        domain: &str,
        path: &str,
    ) -> String {
        let Some(site) = SiteConfig::find(sites, domain) else {
            return self.unmatched_site.to_string();
        };

        match self.resolve_for_site(site, path).await {
            Ok(email) => email,
            Err(e) => {
                log::warn!("Error finding stakeholder for {domain}{path}: {e}");
                self.lookup_failure.to_string()
            }
        }
    }

    async fn resolve_for_site(&self, site: &SiteConfig, path: &str) -> Result<String> {
        let mut mappings = self.mappings.list_stakeholder_mappings(&site.id).await?;
        mappings.retain(|m| m.is_active);
        // Stable sort keeps store order among equal priorities.
        mappings.sort_by(|a, b| b.priority.cmp(&a.priority));

        for mapping in &mappings {
            if self.matches(mapping, path)? {
                log::debug!(
                    "Path {path} matched {} (priority {})",
                    mapping.pattern,
                    mapping.priority
                );
                return Ok(mapping.email.clone());
            }
        }

        Ok(site.default_stakeholder.clone())
    }

    fn matches(&self, mapping: &StakeholderMapping, path: &str) -> Result<bool> {
        match mapping.kind {
            MappingType::Pattern => Ok(self.compiled(&mapping.pattern)?.is_match(path)),
            _ => mapping_matches(mapping, path),
        }
    }

    fn compiled(&self, pattern: &str) -> Result<Regex> {
        let mut cache = self
            .patterns
            .lock()
            .map_err(|_| AppError::validation("pattern cache lock poisoned"))?;
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }
        let regex = wildcard_regex(pattern)?;
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

/// Whether a mapping applies to `path`.
///
/// `exact` compares verbatim; `pattern` treats each `*` as any run of
/// characters and must match the whole path; `department` never matches.
pub fn mapping_matches(mapping: &StakeholderMapping, path: &str) -> Result<bool> {
    match mapping.kind {
        MappingType::Exact => Ok(mapping.pattern == path),
        MappingType::Pattern => Ok(wildcard_regex(&mapping.pattern)?.is_match(path)),
        MappingType::Department => Ok(false),
    }
}

fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
        .map_err(|e| AppError::validation(format!("invalid pattern '{pattern}': {e}")))
}
