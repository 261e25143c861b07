// src/services/classify.rs

//! Age computation and expiry / engagement classification.
//!
//! The two flags are independent here; expired-over-low-engagement
//! precedence is applied when a run's pages are partitioned.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{ProcessingConfig, SiteConfig, round1};

const SECONDS_PER_DAY: i64 = 86_400;
const DAYS_PER_YEAR: f64 = 365.25;

/// Thresholds in force for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub expiry_days: i64,
    pub engagement_threshold: u64,
}

impl From<&SiteConfig> for Thresholds {
    fn from(site: &SiteConfig) -> Self {
        Self {
            expiry_days: site.expiry_days,
            engagement_threshold: site.engagement_threshold,
        }
    }
}

/// Age and flags computed for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub age_in_days: i64,
    pub age_in_years: f64,
    pub is_expired: bool,
    pub is_low_engagement: bool,
}

/// Whole days from the start (UTC midnight) of `created` to `now`, floored.
pub fn age_in_days(created: NaiveDate, now: DateTime<Utc>) -> i64 {
    let start = created.and_time(chrono::NaiveTime::MIN).and_utc();
    (now - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Applies site thresholds, or the configured defaults, to pages.
#[derive(Debug, Clone)]
pub struct Classifier {
    defaults: Thresholds,
    grace_period_days: i64,
}

impl Classifier {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            defaults: Thresholds {
                expiry_days: config.default_expiry_days,
                engagement_threshold: config.default_engagement_threshold,
            },
            grace_period_days: config.grace_period_days,
        }
    }

    /// Thresholds of the matched site, or the defaults when none matched.
    pub fn thresholds_for(&self, site: Option<&SiteConfig>) -> Thresholds {
        site.map(Thresholds::from).unwrap_or(self.defaults)
    }

    pub fn classify(
        &self,
        created: NaiveDate,
        page_views: u64,
        thresholds: Thresholds,
        now: DateTime<Utc>,
    ) -> Classification {
        let age_in_days = age_in_days(created, now);
        Classification {
            age_in_days,
            age_in_years: round1(age_in_days as f64 / DAYS_PER_YEAR),
            is_expired: age_in_days > thresholds.expiry_days,
            is_low_engagement: page_views < thresholds.engagement_threshold
                && age_in_days > self.grace_period_days,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}
