//! Request payloads.
//!
//! Each payload serializes to the camelCase JSON body the service expects.
//! Optional fields are left off the wire entirely when unset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::JsonObject;
use crate::error::CoreError;

// ============================================================================
// Format
// ============================================================================

/// Output formats a scrape can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Cleaned markdown.
    Markdown,
    /// Cleaned HTML.
    Html,
    /// Structured JSON.
    Json,
    /// Raw page source.
    Raw,
}

impl Format {
    /// All formats.
    pub fn all() -> &'static [Format] {
        &[Format::Markdown, Format::Html, Format::Json, Format::Raw]
    }

    /// Wire name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Json => "json",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "raw" | "rawhtml" => Ok(Self::Raw),
            other => Err(CoreError::UnknownFormat(other.to_string())),
        }
    }
}

// ============================================================================
// Scrape
// ============================================================================

/// Payload for `POST /v2/scrape`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapePayload {
    /// Page to scrape.
    pub url: String,
    /// Requested output formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<Format>>,
    /// Strip navigation, footers and similar chrome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,
    /// Milliseconds to wait for the page before capturing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
    /// Server-side scrape timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Emulate a mobile device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<bool>,
    /// Only keep these tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_tags: Option<Vec<String>>,
    /// Drop these tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<Vec<String>>,
    /// Accept invalid TLS certificates on the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_tls_verification: Option<bool>,
}

impl ScrapePayload {
    /// Creates a payload for the given URL with server defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the requested formats.
    pub fn with_formats(mut self, formats: Vec<Format>) -> Self {
        self.formats = Some(formats);
        self
    }

    /// Checks the fields a form would refuse to submit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` when the URL is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_blank("url", &self.url)
    }
}

// ============================================================================
// Search
// ============================================================================

/// Scrape settings applied to each search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    /// Requested output formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<Format>>,
    /// Strip navigation, footers and similar chrome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,
}

/// Payload for `POST /v2/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    /// Search query.
    pub query: String,
    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Result language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Result country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Scrape each hit with these options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_options: Option<ScrapeOptions>,
}

impl SearchPayload {
    /// Creates a payload for the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Checks the fields a form would refuse to submit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` when the query is blank or the
    /// limit is zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_blank("query", &self.query)?;
        if self.limit == Some(0) {
            return Err(CoreError::InvalidData("limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Crawl
// ============================================================================

/// Payload for `POST /v2/crawl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlPayload {
    /// Start URL.
    pub url: String,
    /// Maximum link depth from the start URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    /// Maximum number of pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Follow links to other domains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_external_links: Option<bool>,
    /// Skip near-duplicate URLs.
    #[serde(
        default,
        rename = "deduplicateSimilarURLs",
        skip_serializing_if = "Option::is_none"
    )]
    pub deduplicate_similar_urls: Option<bool>,
    /// Follow links into subdomains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
}

impl CrawlPayload {
    /// Creates a payload for the given start URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Checks the fields a form would refuse to submit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` when the URL is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_blank("url", &self.url)
    }
}

// ============================================================================
// Extract
// ============================================================================

/// Payload for `POST /v2/extract`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPayload {
    /// Pages to extract from.
    pub urls: Vec<String>,
    /// Extraction instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// System prompt for the extraction model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// JSON schema the result must follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonObject>,
    /// Follow links to other domains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_external_links: Option<bool>,
    /// Let the service search the web for extra context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_web_search: Option<bool>,
    /// Follow links into subdomains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
}

impl ExtractPayload {
    /// Creates a payload for the given URLs.
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Default::default()
        }
    }

    /// Checks the fields a form would refuse to submit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` when no URL is given or one is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.urls.is_empty() {
            return Err(CoreError::InvalidData("at least one url is required".to_string()));
        }
        for url in &self.urls {
            require_non_blank("urls", url)?;
        }
        Ok(())
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidData(format!("{field} must not be empty")));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_payload_minimal_body() {
        let payload = ScrapePayload::new("https://example.com");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"url":"https://example.com"}"#);
    }

    #[test]
    fn test_scrape_payload_camel_case() {
        let mut payload = ScrapePayload::new("https://example.com")
            .with_formats(vec![Format::Markdown, Format::Html]);
        payload.only_main_content = Some(true);
        payload.wait_for = Some(500);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["formats"], serde_json::json!(["markdown", "html"]));
        assert_eq!(value["onlyMainContent"], true);
        assert_eq!(value["waitFor"], 500);
    }

    #[test]
    fn test_crawl_dedup_wire_name() {
        let mut payload = CrawlPayload::new("https://example.com");
        payload.deduplicate_similar_urls = Some(true);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["deduplicateSimilarURLs"], true);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("Markdown".parse::<Format>().unwrap(), Format::Markdown);
        assert_eq!("md".parse::<Format>().unwrap(), Format::Markdown);
        assert!("pdf".parse::<Format>().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(ScrapePayload::new("  ").validate().is_err());
        assert!(SearchPayload::new("").validate().is_err());
        assert!(ExtractPayload::new(vec![]).validate().is_err());
        assert!(ExtractPayload::new(vec!["https://a.dev".to_string()]).validate().is_ok());

        let mut search = SearchPayload::new("rust");
        search.limit = Some(0);
        assert!(search.validate().is_err());
    }
}
