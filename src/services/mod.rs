//! Service layer for the page expiry engine.
//!
//! This module contains the business logic for:
//! - Age and expiry/engagement classification (`Classifier`)
//! - Stakeholder routing (`StakeholderResolver`)
//! - Alert delivery (`AlertDispatcher`)

pub mod alerts;
mod classify;
mod stakeholders;

pub use alerts::{
    AlertDispatcher, DispatchEntry, DispatchReport, DispatchStatus, EmailTransport, LogTransport,
    NotificationLog, PageSummary, SendOutcome,
};
pub use classify::{Classification, Classifier, Thresholds, age_in_days};
pub use stakeholders::{StakeholderResolver, mapping_matches};
