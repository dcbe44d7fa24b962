//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured base URL cannot be used.
    #[error(transparent)]
    InvalidBaseUrl(#[from] BaseUrlError),
}

impl StoreError {
    /// Returns true if the settings themselves need fixing.
    pub fn is_config_error(&self) -> bool {
        matches!(self, StoreError::InvalidBaseUrl(_))
    }
}

/// Why a base URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BaseUrlError {
    /// Nothing was entered.
    #[error("Base URL is required")]
    Missing,

    /// The value does not parse as a URL.
    #[error("Invalid URL")]
    Invalid,

    /// The scheme is neither http nor https.
    #[error("URL must use http or https")]
    UnsupportedScheme,
}
