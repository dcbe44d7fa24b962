//! Serde tests for core types.
//!
//! These tests pin the wire shapes the service sends and expects: camelCase
//! names, omitted optionals, and unknown fields surviving a round-trip.

use serde_json::json;

use crate::{
    ActivityItem, Changelog, CrawlResponse, ExtractPayload, HealthResult, ScrapeResponse,
    SearchResponse, UsageSummary,
};

// ============================================================================
// Response Tests
// ============================================================================

#[test]
fn test_scrape_response_keeps_unknown_fields() {
    let value = json!({
        "success": true,
        "data": {"markdown": "# Hello"},
        "warning": "slow page"
    });

    let response: ScrapeResponse = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(response.data, Some(json!({"markdown": "# Hello"})));
    assert_eq!(response.extra.get("success"), Some(&json!(true)));

    let back = serde_json::to_value(&response).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_empty_object_is_a_valid_response() {
    let scrape: ScrapeResponse = serde_json::from_value(json!({})).unwrap();
    assert!(scrape.data.is_none());

    let search: SearchResponse = serde_json::from_value(json!({})).unwrap();
    assert!(search.results.is_none());
}

#[test]
fn test_crawl_response_job_id() {
    let response: CrawlResponse =
        serde_json::from_value(json!({"jobId": "abc", "status": "scraping"})).unwrap();
    assert_eq!(response.job_id.as_deref(), Some("abc"));
    assert_eq!(response.status.as_deref(), Some("scraping"));
}

#[test]
fn test_search_results_parse() {
    let response: SearchResponse = serde_json::from_value(json!({
        "results": [
            {"title": "Rust", "url": "https://rust-lang.org", "score": 0.9},
            {"url": "https://docs.rs"}
        ]
    }))
    .unwrap();

    let results = response.results.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].score, Some(0.9));
    assert!(results[1].title.is_none());
}

// ============================================================================
// Changelog Tests
// ============================================================================

#[test]
fn test_changelog_releases_shape() {
    let changelog: Changelog = serde_json::from_value(json!([
        {"version": "2.1.0", "date": "2024-05-01", "entries": ["Faster crawls"]}
    ]))
    .unwrap();

    assert!(matches!(changelog, Changelog::Releases(ref r) if r.len() == 1));
    assert_eq!(
        changelog.lines(),
        vec!["2.1.0 (2024-05-01)".to_string(), "  - Faster crawls".to_string()]
    );
}

#[test]
fn test_changelog_notes_shape() {
    let changelog: Changelog =
        serde_json::from_value(json!({"entries": ["one", "two"]})).unwrap();
    assert_eq!(changelog.lines(), vec!["- one".to_string(), "- two".to_string()]);
    assert!(!changelog.is_empty());

    let empty: Changelog = serde_json::from_value(json!({})).unwrap();
    assert!(empty.is_empty());
}

// ============================================================================
// Record Tests
// ============================================================================

#[test]
fn test_activity_item_type_field() {
    let item: ActivityItem = serde_json::from_value(json!({
        "id": "job-1",
        "type": "crawl",
        "createdAt": "2024-01-01T00:00:00.000Z"
    }))
    .unwrap();

    assert_eq!(item.kind.as_deref(), Some("crawl"));
    assert_eq!(item.display_id(), "job-1");
    assert!(!item.is_legacy());

    let back = serde_json::to_value(&item).unwrap();
    assert_eq!(back["type"], "crawl");
    assert!(back.get("source").is_none());
}

#[test]
fn test_usage_summary_integer_credits() {
    let summary: UsageSummary = serde_json::from_value(json!({
        "plan": "pro",
        "creditsRemaining": 500,
        "creditsUsed": 500,
        "seats": 3
    }))
    .unwrap();

    assert_eq!(summary.credits_remaining, Some(500.0));
    assert_eq!(summary.extra.get("seats"), Some(&json!(3)));
    assert!(!summary.is_legacy());
}

#[test]
fn test_health_info_roundtrip() {
    let health: HealthResult = serde_json::from_value(json!({
        "status": "ok",
        "version": "2.0.0",
        "info": {"queue": "redis"}
    }))
    .unwrap();

    assert_eq!(health.version.as_deref(), Some("2.0.0"));
    assert_eq!(health.info.get("queue"), Some(&json!("redis")));
    assert!(health.checked_endpoint().is_none());
}

#[test]
fn test_extract_payload_schema() {
    let mut payload = ExtractPayload::new(vec!["https://example.com".to_string()]);
    payload.schema = json!({"type": "object"}).as_object().cloned();
    payload.prompt = Some("Get the title".to_string());

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["schema"]["type"], "object");
    assert_eq!(value["prompt"], "Get the title");
    assert!(value.get("systemPrompt").is_none());
}
