//! Processed page rows and the per-file result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One processed row of the uploaded export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// URL as given in the sheet (trimmed)
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub created_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<NaiveDate>,

    pub page_views: u64,

    pub domain: String,

    pub path: String,

    /// Whole days between creation and the processing instant; negative for future dates
    pub age_in_days: i64,

    /// `age_in_days / 365.25`, one decimal
    pub age_in_years: f64,

    pub is_expired: bool,

    pub is_low_engagement: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stakeholder: Option<String>,
}

/// Earliest and latest creation date across a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Outcome of one processing run. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub file_name: String,
    pub upload_date: NaiveDate,
    pub total_pages: usize,
    pub expired_pages: usize,
    pub low_engagement_pages: usize,
    pub total_page_views: u64,
    pub date_range: DateRange,
    pub average_page_age: f64,
    pub average_page_views: f64,
    pub pages_over_2_years: usize,
    pub expired_pages_data: Vec<PageRecord>,
    pub low_engagement_data: Vec<PageRecord>,
    pub all_pages_data: Vec<PageRecord>,
}

impl ProcessingResult {
    /// Pages that should produce an alert, expired first.
    pub fn flagged_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.expired_pages_data
            .iter()
            .chain(self.low_engagement_data.iter())
    }
}

/// Round to one decimal place; halves round toward positive infinity.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}
