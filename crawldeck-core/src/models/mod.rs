//! Domain models for Crawldeck.
//!
//! This module contains the request and response shapes of the scraping
//! service plus the normalized records the client synthesizes when it has
//! to fall back to older API surfaces.
//!
//! ## Submodules
//!
//! - [`payload`] - Request payloads (scrape, search, crawl, extract)
//! - [`response`] - Operation responses and the changelog
//! - [`health`] - Health result with probe diagnostics
//! - [`activity`] - Job and queue activity records
//! - [`usage`] - Usage/quota summary

mod activity;
mod health;
mod payload;
mod response;
mod usage;

/// A JSON object as produced by `serde_json`.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

// Re-export everything at the models level
pub use activity::ActivityItem;
pub use health::{CHECKED_ENDPOINT_KEY, FALLBACK_KEY, HealthResult, NOTE_KEY};
pub use payload::{CrawlPayload, ExtractPayload, Format, ScrapeOptions, ScrapePayload, SearchPayload};
pub use response::{
    Changelog, ChangelogEntry, CrawlResponse, ExtractResponse, ScrapeResponse, SearchResponse,
    SearchResult,
};
pub use usage::UsageSummary;
#[cfg(test)]
mod serde_tests;
