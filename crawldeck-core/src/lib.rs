// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Crawldeck` Core
//!
//! Core types and models for the `Crawldeck` console.
//!
//! This crate provides the wire-level data structures shared by the API
//! client, the settings store and the CLI:
//!
//! - Operation payloads (scrape, search, crawl, extract)
//! - Operation responses, which keep unknown server fields
//! - Normalized records produced by the client (health, activity, usage)
//! - Error types
//!
//! ## Key Types
//!
//! ### Payloads
//! - [`ScrapePayload`] - Single page scrape request
//! - [`SearchPayload`] - Web search request
//! - [`CrawlPayload`] - Site crawl request
//! - [`ExtractPayload`] - Structured extraction request
//! - [`Format`] - Scrape output formats
//!
//! ### Responses
//! - [`ScrapeResponse`], [`SearchResponse`], [`CrawlResponse`], [`ExtractResponse`]
//! - [`Changelog`] - Release notes in either server shape
//!
//! ### Normalized Records
//! - [`HealthResult`] - Server health with probe diagnostics
//! - [`ActivityItem`] - Job/queue record
//! - [`UsageSummary`] - Quota snapshot

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Payloads
    CrawlPayload,
    ExtractPayload,
    Format,
    ScrapeOptions,
    ScrapePayload,
    SearchPayload,
    // Responses
    Changelog,
    ChangelogEntry,
    CrawlResponse,
    ExtractResponse,
    ScrapeResponse,
    SearchResponse,
    SearchResult,
    // Normalized records
    ActivityItem,
    HealthResult,
    UsageSummary,
    // Health diagnostics keys
    CHECKED_ENDPOINT_KEY,
    FALLBACK_KEY,
    NOTE_KEY,
    // JSON helpers
    JsonObject,
};
