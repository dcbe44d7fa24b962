//! HTTP sender abstraction.
//!
//! The transport never talks to the network directly. It hands a fully
//! built [`HttpRequest`] to an [`HttpSend`] implementation and gets back the
//! status and the complete body text. [`ReqwestSender`] is the production
//! implementation; tests substitute a scripted one.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use std::fmt;
use tracing::{debug, instrument};

use crate::error::HttpError;

/// User agent string for Crawldeck.
const USER_AGENT: &str = concat!("Crawldeck/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request / Response
// ============================================================================

/// HTTP methods the service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET, never carries a body.
    Get,
    /// POST with a JSON body.
    Post,
}

impl Method {
    /// Method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// Returns true if requests with this method carry a body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Serialized JSON body.
    pub body: Option<String>,
}

/// A received response with its full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text, possibly empty.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Sender Trait
// ============================================================================

/// Issues one HTTP request and reads the whole response.
///
/// Implementations must not retry and must not apply their own timeout;
/// deadlines and cancellation are composed by the caller, which drops the
/// returned future to abort an in-flight request.
#[async_trait]
pub trait HttpSend: Send + Sync {
    /// Sends the request.
    ///
    /// Returns `Err` only when no response was obtained. Any HTTP status,
    /// including 4xx/5xx, is a successful send.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// ============================================================================
// Reqwest Sender
// ============================================================================

/// [`HttpSend`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    inner: Client,
}

impl ReqwestSender {
    /// Creates a sender with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, HttpError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { inner: client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { inner: client }
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .inner
            .request(request.method.into(), &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                HttpError::Connect(e.to_string())
            } else if e.is_builder() {
                HttpError::InvalidUrl(e.to_string())
            } else {
                HttpError::Request(e)
            }
        })?;

        let status = response.status().as_u16();
        debug!(status, "Response received");
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// Tests
// ============================================================================
