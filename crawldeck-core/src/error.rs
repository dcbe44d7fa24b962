//! Core error types for `Crawldeck`.

use thiserror::Error;

/// Core error type for `Crawldeck` domain models.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A payload or record failed a local sanity check.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unknown scrape output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
