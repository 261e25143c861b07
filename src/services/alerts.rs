// src/services/alerts.rs

//! Email alert dispatch for flagged pages.
//!
//! Sends one alert per page, strictly in sequence with a fixed pause between
//! sends to stay under the transport's rate limit. A failed page is tallied
//! and the batch moves on.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AlertConfig, PageRecord};

/// Page fields handed to the transport for one alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub url: String,
    pub title: Option<String>,
    pub created_date: NaiveDate,
    pub updated_date: Option<NaiveDate>,
    pub page_views: u64,
}

impl PageSummary {
    /// Alert subject line.
    pub fn subject(&self) -> String {
        format!(
            "Action Required: Expired Page Review - {}",
            self.title.as_deref().unwrap_or(&self.url)
        )
    }
}

impl From<&PageRecord> for PageSummary {
    fn from(page: &PageRecord) -> Self {
        Self {
            url: page.url.clone(),
            title: page.title.clone(),
            created_date: page.created_date,
            updated_date: page.updated_date,
            page_views: page.page_views,
        }
    }
}

/// What a transport reports for a send it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

/// Outbound email delivery.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send an expiry alert for `page` to `recipient`.
    async fn send_expiry_alert(&self, recipient: &str, page: &PageSummary) -> Result<SendOutcome>;
}

/// Records delivered notifications.
#[async_trait]
pub trait NotificationLog: Send + Sync {
    async fn record(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

/// Transport that only logs, for runs without a configured mail provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn send_expiry_alert(&self, recipient: &str, page: &PageSummary) -> Result<SendOutcome> {
        log::info!("Simulating alert to {recipient}: {}", page.subject());
        Ok(SendOutcome {
            success: true,
            message: format!("Email successfully sent to {recipient} (simulated)"),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Sent,
    Failed,
}

/// Per-page dispatch outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchEntry {
    /// Page URL
    pub page: String,
    pub status: DispatchStatus,
    pub message: String,
}

/// Tally of one dispatch batch; `results` follows input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<DispatchEntry>,
}

/// Sequential alert sender.
pub struct AlertDispatcher<'a> {
    transport: &'a dyn EmailTransport,
    notifications: Option<&'a dyn NotificationLog>,
    fallback_recipient: String,
    delay: Duration,
}

impl<'a> AlertDispatcher<'a> {
    pub fn new(transport: &'a dyn EmailTransport, config: &AlertConfig) -> Self {
        Self {
            transport,
            notifications: None,
            fallback_recipient: config.fallback_recipient.clone(),
            delay: config.send_delay(),
        }
    }

    /// Record every successful send through `log`.
    pub fn with_notification_log(mut self, log: &'a dyn NotificationLog) -> Self {
        self.notifications = Some(log);
        self
    }

    /// Send one alert per page, in order.
    pub async fn send_alerts(&self, pages: &[PageRecord]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (i, page) in pages.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let recipient = page
                .stakeholder
                .as_deref()
                .unwrap_or(&self.fallback_recipient);
            let summary = PageSummary::from(page);

            let (status, message) = match self.send_one(recipient, &summary).await {
                Ok(outcome) if outcome.success => {
                    log::debug!("Alert for {} sent to {recipient}", page.url);
                    (DispatchStatus::Sent, outcome.message)
                }
                Ok(_) => {
                    log::warn!("Alert for {} was not accepted by the transport", page.url);
                    (DispatchStatus::Failed, "Unknown error".to_string())
                }
                Err(e) => {
                    log::warn!("Alert for {} failed: {e}", page.url);
                    (DispatchStatus::Failed, e.to_string())
                }
            };

            match status {
                DispatchStatus::Sent => report.sent += 1,
                DispatchStatus::Failed => report.failed += 1,
            }
            report.results.push(DispatchEntry {
                page: page.url.clone(),
                status,
                message,
            });
        }

        log::info!(
            "Alert dispatch finished: {} sent, {} failed",
            report.sent,
            report.failed
        );
        report
    }

    async fn send_one(&self, recipient: &str, summary: &PageSummary) -> Result<SendOutcome> {
        let outcome = self.transport.send_expiry_alert(recipient, summary).await?;
        if outcome.success {
            if let Some(notifications) = self.notifications {
                let body = format!("Expired page alert for {}", summary.url);
                notifications
                    .record(recipient, &summary.subject(), &body)
                    .await?;
            }
        }
        Ok(outcome)
    }
}
