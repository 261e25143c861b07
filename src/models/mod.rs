// src/models/mod.rs

//! Domain models for the page expiry engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod page;
mod sheet;
mod site;

// Re-export all public types
pub use config::{AlertConfig, ColumnRole, ColumnRule, Config, ProcessingConfig};
pub use page::{DateRange, PageRecord, ProcessingResult};
pub(crate) use page::round1;
pub use sheet::{Cell, Sheet, UploadedFile};
pub use site::{MappingType, SiteConfig, StakeholderMapping};
