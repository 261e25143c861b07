// src/error.rs

//! Unified error handling for the page expiry engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The uploaded file could not be decoded as a spreadsheet
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Workbook decoding failed inside calamine
    #[error("Spreadsheet error: {0}")]
    Calamine(#[from] calamine::Error),

    /// CSV decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A mandatory column was not found in the header row
    #[error("Could not find {role} column. Please ensure your file has a column containing {hint}")]
    MissingColumn { role: String, hint: String },

    /// A whole processing run failed
    #[error("Failed to process file: {message}")]
    Processing { file: String, message: String },

    /// A configuration or mapping store call failed
    #[error("Store error: {0}")]
    Store(String),

    /// The email transport rejected or failed a send
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a spreadsheet decoding error.
    pub fn spreadsheet(message: impl fmt::Display) -> Self {
        Self::Spreadsheet(message.to_string())
    }

    /// Create a missing-column error listing the header substrings that were tried.
    pub fn missing_column(role: impl Into<String>, synonyms: &[String]) -> Self {
        let hint = synonyms
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(" or ");
        Self::MissingColumn {
            role: role.into(),
            hint,
        }
    }

    /// Wrap a fatal error with the name of the file being processed.
    pub fn processing(file: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::Processing {
            file: file.into(),
            message: cause.to_string(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a transport error.
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
