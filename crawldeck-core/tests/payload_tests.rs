//! Integration tests for request payloads.

use crawldeck_core::{CrawlPayload, Format, ScrapePayload, SearchPayload, ScrapeOptions};

#[test]
fn test_search_payload_nested_scrape_options() {
    let mut payload = SearchPayload::new("self-hosted scraping");
    payload.limit = Some(5);
    payload.scrape_options = Some(ScrapeOptions {
        formats: Some(vec![Format::Markdown]),
        only_main_content: Some(true),
    });

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["scrapeOptions"]["formats"][0], "markdown");
    assert_eq!(value["scrapeOptions"]["onlyMainContent"], true);
    assert!(value.get("lang").is_none());
}

#[test]
fn test_payloads_accept_camel_case_input() {
    let scrape: ScrapePayload = serde_json::from_str(
        r#"{"url":"https://example.com","onlyMainContent":false,"excludeTags":["nav"]}"#,
    )
    .unwrap();
    assert_eq!(scrape.only_main_content, Some(false));
    assert_eq!(scrape.exclude_tags, Some(vec!["nav".to_string()]));

    let crawl: CrawlPayload =
        serde_json::from_str(r#"{"url":"https://example.com","maxDepth":2}"#).unwrap();
    assert_eq!(crawl.max_depth, Some(2));
    assert!(crawl.validate().is_ok());
}
