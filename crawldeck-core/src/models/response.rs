//! Operation responses.
//!
//! Server versions disagree on which fields they return, so every response
//! keeps whatever it does not model in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonObject;

/// Response of `POST /v2/scrape`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    /// Scraped document(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Job reference when the scrape runs asynchronously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A single search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page URL.
    #[serde(default)]
    pub url: String,
    /// Short excerpt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Scraped content when scrape options were given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Relevance score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Response of `POST /v2/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Search hits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
    /// Raw data for servers that do not return `results`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Response of `POST /v2/crawl`.
///
/// The crawl itself runs server-side; `job_id` is only a reference to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResponse {
    /// Job reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Job status at submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Inline results, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Response of `POST /v2/extract`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    /// Extracted data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Job reference when extraction runs asynchronously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

// ============================================================================
// Changelog
// ============================================================================

/// One release in the changelog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Release version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Release date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Release notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Response of `GET /v2/changelog`.
///
/// Servers return either a list of releases or a flat list of notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Changelog {
    /// Versioned releases.
    Releases(Vec<ChangelogEntry>),
    /// Flat notes without versions.
    Notes {
        /// Release notes.
        #[serde(default)]
        entries: Option<Vec<String>>,
    },
}

impl Changelog {
    /// Flattens the changelog into printable lines.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Releases(releases) => releases
                .iter()
                .flat_map(|release| {
                    let header = match (&release.version, &release.date) {
                        (Some(v), Some(d)) => Some(format!("{v} ({d})")),
                        (Some(v), None) => Some(v.clone()),
                        (None, Some(d)) => Some(d.clone()),
                        (None, None) => None,
                    };
                    header
                        .into_iter()
                        .chain(
                            release
                                .entries
                                .iter()
                                .flatten()
                                .map(|entry| format!("  - {entry}")),
                        )
                        .collect::<Vec<_>>()
                })
                .collect(),
            Self::Notes { entries } => entries
                .iter()
                .flatten()
                .map(|entry| format!("- {entry}"))
                .collect(),
        }
    }

    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Releases(releases) => releases.is_empty(),
            Self::Notes { entries } => entries.as_ref().is_none_or(Vec::is_empty),
        }
    }
}

impl Default for Changelog {
    fn default() -> Self {
        Self::Notes { entries: None }
    }
}
