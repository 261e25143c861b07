//! Per-domain site policy and stakeholder routing rules.

use serde::{Deserialize, Serialize};

/// Policy bundle for one monitored domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    /// Store identifier, referenced by `StakeholderMapping::site_id`
    pub id: String,

    /// Domain as configured (may carry a `www.` prefix)
    pub domain: String,

    /// Human-readable site name
    #[serde(default)]
    pub name: String,

    #[serde(default = "enabled_default")]
    pub enabled: bool,

    /// Pages older than this many days are expired
    pub expiry_days: i64,

    /// Pages with fewer views than this are low-engagement
    pub engagement_threshold: u64,

    /// Age under which a page counts as newly published
    #[serde(default = "new_page_days_default")]
    pub new_page_days: i64,

    /// Recipient used when no mapping matches a path
    pub default_stakeholder: String,
}

fn enabled_default() -> bool {
    true
}

fn new_page_days_default() -> i64 {
    30
}

impl SiteConfig {
    /// Bidirectional substring match against a page hostname.
    ///
    /// A site matches when the hostname contains the configured domain with
    /// `www.` stripped, or the configured domain contains the hostname. Two
    /// configured domains that nest (`example.com`, `legal.example.com`) can
    /// both match one hostname; callers take the first match in store order.
    pub fn matches_domain(&self, domain: &str) -> bool {
        domain.contains(&self.domain.replacen("www.", "", 1)) || self.domain.contains(domain)
    }

    /// Return the first site in `sites` matching `domain`.
    pub fn find<'a>(sites: &'a [SiteConfig], domain: &str) -> Option<&'a SiteConfig> {
        sites.iter().find(|site| site.matches_domain(domain))
    }
}

/// How a mapping's pattern is compared against a page path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    /// Verbatim path equality
    Exact,
    /// `*` wildcards, anchored at both ends
    Pattern,
    /// Organisational grouping; never matched against paths
    Department,
}

/// A rule routing URL paths of one site to a responsible email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakeholderMapping {
    #[serde(default)]
    pub id: String,

    pub site_id: String,

    pub pattern: String,

    pub email: String,

    #[serde(rename = "type")]
    pub kind: MappingType,

    /// Higher wins when several mappings apply
    #[serde(default)]
    pub priority: i64,

    #[serde(default = "enabled_default")]
    pub is_active: bool,
}
