//! Error types for the basket-core library.
//!
//! Malformed spreadsheet *data* never surfaces here; it is reported through
//! [`crate::diagnostics::Diagnostics`]. These errors cover contract violations
//! in the input shape and configuration problems.

use thiserror::Error;

/// Main error type for the basket library.
#[derive(Error, Debug)]
pub enum BasketError {
    /// No vendor profile is registered for the requested vendor.
    #[error("unsupported vendor: {0}")]
    UnsupportedVendor(String),

    /// The workbook handed to the engine violates its shape contract.
    #[error("invalid workbook: {0}")]
    InvalidWorkbook(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the basket library.
pub type Result<T> = std::result::Result<T, BasketError>;
