//! Error types for AV metadata extraction

use thiserror::Error;

/// Main error type
///
/// Absent fields are never errors: extraction degrades to "no value". Only
/// identifier validation and configuration loading fail loudly.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Check digit mismatch for {bib}: expected {expected}, got {actual}")]
    CheckDigitMismatch {
        bib: String,
        expected: char,
        actual: char,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type alias for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
