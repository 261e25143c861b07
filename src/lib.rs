// src/lib.rs

//! Page expiry engine: flags stale and low-traffic pages in analytics exports
//! and routes alerts to their owners.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
