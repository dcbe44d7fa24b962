//! Client error types.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Status code reported for client-side timeouts.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status code that marks an endpoint as absent.
pub const NOT_FOUND_STATUS: u16 = 404;

/// Status code some servers use for a path that exists with another method.
pub const METHOD_NOT_ALLOWED_STATUS: u16 = 405;

// ============================================================================
// Client Error
// ============================================================================

/// Classified failure of a client call.
///
/// Every failure the client surfaces is one of these variants; callers
/// branch on [`ClientError::kind`] or the helper predicates instead of
/// inspecting messages.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// No response was obtained (DNS, connection refused, reset, ...).
    #[error("{message}")]
    Network {
        /// Transport-level description.
        message: String,
    },

    /// The per-request deadline fired before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// The caller's cancellation signal fired.
    #[error("{}", .reason.as_deref().unwrap_or("Request aborted"))]
    Cancelled {
        /// Reason the caller gave when cancelling, preserved verbatim.
        reason: Option<String>,
    },

    /// The server answered outside the 2xx range.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-supplied `message`, or a generic description.
        message: String,
        /// Parsed error body, if it was JSON.
        body: Option<Value>,
    },

    /// A payload could not be encoded or a response did not match its type.
    #[error("Invalid response: {message}")]
    Serialization {
        /// Serde error description.
        message: String,
    },
}

impl ClientError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a cancellation error carrying the caller's reason.
    pub fn cancelled(reason: Option<String>) -> Self {
        Self::Cancelled { reason }
    }

    /// Creates an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>, body: Option<Value>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body,
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a 404 error with no body.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(NOT_FOUND_STATUS, message, None)
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Timeout => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Http { .. } => ErrorKind::HttpStatus,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Status code associated with this error.
    ///
    /// Timeouts report 408; network and cancellation errors have none.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Timeout => Some(TIMEOUT_STATUS),
            _ => None,
        }
    }

    /// Parsed error body, if the server sent JSON.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns true for an HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == NOT_FOUND_STATUS)
    }

    /// Returns true for an HTTP 404 or 405.
    pub fn is_absent_endpoint(&self) -> bool {
        matches!(
            self,
            Self::Http { status, .. }
                if *status == NOT_FOUND_STATUS || *status == METHOD_NOT_ALLOWED_STATUS
        )
    }

    /// Returns true if the caller cancelled the call.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true if the server does not offer the operation at all.
    ///
    /// For probed operations this means every known surface was tried.
    pub fn is_unsupported(&self) -> bool {
        self.is_not_found()
    }

    /// Cancellation reason, if this is a cancellation.
    pub fn cancel_reason(&self) -> Option<&str> {
        match self {
            Self::Cancelled { reason } => reason.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

// ============================================================================
// Error Kind
// ============================================================================

/// Classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response obtained.
    Network,
    /// Deadline fired before a response.
    Timeout,
    /// Caller-initiated abort.
    Cancelled,
    /// Server responded outside 2xx.
    HttpStatus,
    /// Payload or response did not (de)serialize.
    Serialization,
}

impl ErrorKind {
    /// Returns the display name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NETWORK",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::HttpStatus => "HTTP_STATUS",
            Self::Serialization => "SERIALIZATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// Failure of the underlying HTTP sender, before any response exists.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error from the HTTP stack.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<HttpError> for ClientError {
    fn from(err: HttpError) -> Self {
        Self::network(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
