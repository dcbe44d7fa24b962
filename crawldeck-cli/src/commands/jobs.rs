//! Job commands - scrape, search, crawl and extract.
//!
//! Each builds a payload from its flags, checks it locally, and posts it.

use anyhow::{Context, Result};
use clap::Args;
use crawldeck_core::{
    CoreError, CrawlPayload, ExtractPayload, Format, JsonObject, ScrapeOptions, ScrapePayload,
    SearchPayload,
};
use crawldeck_fetch::CancelSignal;
use tracing::debug;

use super::{connect, print_json, wants_json};
use crate::Cli;
use crate::output::TextFormatter;

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the scrape command.
#[derive(Args)]
pub struct ScrapeArgs {
    /// Page to scrape.
    pub url: String,

    /// Output formats, comma-separated (markdown, html, json, raw).
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<Format>,

    /// Keep only the main content of the page.
    #[arg(long)]
    pub only_main_content: bool,

    /// Wait this many milliseconds before scraping.
    #[arg(long)]
    pub wait_for: Option<u64>,

    /// Server-side page timeout in milliseconds.
    #[arg(long)]
    pub page_timeout: Option<u64>,

    /// Emulate a mobile device.
    #[arg(long)]
    pub mobile: bool,

    /// Only keep these tags, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub include_tags: Vec<String>,

    /// Drop these tags, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub exclude_tags: Vec<String>,

    /// Skip TLS certificate verification on the target page.
    #[arg(long)]
    pub skip_tls_verification: bool,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,

    /// Maximum number of results.
    #[arg(long, short)]
    pub limit: Option<u32>,

    /// Result language.
    #[arg(long)]
    pub lang: Option<String>,

    /// Result country.
    #[arg(long)]
    pub country: Option<String>,

    /// Scrape each hit in these formats, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub scrape_formats: Vec<Format>,
}

/// Arguments for the crawl command.
#[derive(Args)]
pub struct CrawlArgs {
    /// Start URL.
    pub url: String,

    /// Maximum link depth.
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Maximum number of pages.
    #[arg(long, short)]
    pub limit: Option<u32>,

    /// Follow links to other domains.
    #[arg(long)]
    pub allow_external_links: bool,

    /// Skip pages whose URLs differ only trivially.
    #[arg(long)]
    pub deduplicate: bool,

    /// Include subdomains of the start URL.
    #[arg(long)]
    pub include_subdomains: bool,
}

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Pages to extract from.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// What to extract.
    #[arg(long, short)]
    pub prompt: Option<String>,

    /// System prompt for the extractor.
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// JSON schema, inline or as @path.
    #[arg(long)]
    pub schema: Option<String>,

    /// Follow links to other domains.
    #[arg(long)]
    pub allow_external_links: bool,

    /// Let the extractor search the web.
    #[arg(long)]
    pub enable_web_search: bool,

    /// Include subdomains of the given URLs.
    #[arg(long)]
    pub include_subdomains: bool,
}

// ============================================================================
// Payload Builders
// ============================================================================

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

fn non_empty<T>(values: &[T]) -> Option<Vec<T>>
where
    T: Clone,
{
    (!values.is_empty()).then(|| values.to_vec())
}

impl ScrapeArgs {
    /// Builds the scrape payload.
    pub fn payload(&self) -> ScrapePayload {
        ScrapePayload {
            formats: non_empty(&self.formats),
            only_main_content: flag(self.only_main_content),
            wait_for: self.wait_for,
            timeout: self.page_timeout,
            mobile: flag(self.mobile),
            include_tags: non_empty(&self.include_tags),
            exclude_tags: non_empty(&self.exclude_tags),
            skip_tls_verification: flag(self.skip_tls_verification),
            ..ScrapePayload::new(&self.url)
        }
    }
}

impl SearchArgs {
    /// Builds the search payload.
    pub fn payload(&self) -> SearchPayload {
        SearchPayload {
            limit: self.limit,
            lang: self.lang.clone(),
            country: self.country.clone(),
            scrape_options: non_empty(&self.scrape_formats).map(|formats| ScrapeOptions {
                formats: Some(formats),
                ..Default::default()
            }),
            ..SearchPayload::new(&self.query)
        }
    }
}

impl CrawlArgs {
    /// Builds the crawl payload.
    pub fn payload(&self) -> CrawlPayload {
        CrawlPayload {
            max_depth: self.max_depth,
            limit: self.limit,
            allow_external_links: flag(self.allow_external_links),
            deduplicate_similar_urls: flag(self.deduplicate),
            include_subdomains: flag(self.include_subdomains),
            ..CrawlPayload::new(&self.url)
        }
    }
}

impl ExtractArgs {
    /// Builds the extract payload, reading the schema if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema file is unreadable or the schema is
    /// not a JSON object.
    pub async fn payload(&self) -> Result<ExtractPayload> {
        let schema = match &self.schema {
            Some(raw) => Some(load_schema(raw).await?),
            None => None,
        };

        Ok(ExtractPayload {
            prompt: self.prompt.clone(),
            system_prompt: self.system_prompt.clone(),
            schema,
            allow_external_links: flag(self.allow_external_links),
            enable_web_search: flag(self.enable_web_search),
            include_subdomains: flag(self.include_subdomains),
            ..ExtractPayload::new(self.urls.clone())
        })
    }
}

async fn load_schema(raw: &str) -> Result<JsonObject> {
    let text = match raw.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read schema file {path}"))?,
        None => raw.to_string(),
    };
    parse_schema(&text)
}

fn parse_schema(text: &str) -> Result<JsonObject> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(CoreError::from)?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(CoreError::InvalidData("schema must be a JSON object".to_string()).into()),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Runs the scrape command.
pub async fn scrape(args: &ScrapeArgs, cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let payload = args.payload();
    payload.validate()?;
    debug!(url = %payload.url, "Scraping");

    let session = connect(cli, signal).await?;
    let response = session.client.scrape(&payload, &session.options).await?;

    if wants_json(cli) {
        return print_json(&response, cli);
    }
    println!("{}", TextFormatter::new(!cli.no_color).format_scrape(&response));
    Ok(())
}

/// Runs the search command.
pub async fn search(args: &SearchArgs, cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let payload = args.payload();
    payload.validate()?;
    debug!(query = %payload.query, "Searching");

    let session = connect(cli, signal).await?;
    let response = session.client.search(&payload, &session.options).await?;

    if wants_json(cli) {
        return print_json(&response, cli);
    }
    println!("{}", TextFormatter::new(!cli.no_color).format_search(&response));
    Ok(())
}

/// Runs the crawl command.
pub async fn crawl(args: &CrawlArgs, cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let payload = args.payload();
    payload.validate()?;
    debug!(url = %payload.url, "Starting crawl");

    let session = connect(cli, signal).await?;
    let response = session.client.crawl(&payload, &session.options).await?;

    if wants_json(cli) {
        return print_json(&response, cli);
    }
    println!("{}", TextFormatter::new(!cli.no_color).format_crawl(&response));
    Ok(())
}

/// Runs the extract command.
pub async fn extract(args: &ExtractArgs, cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let payload = args.payload().await?;
    payload.validate()?;
    debug!(urls = payload.urls.len(), "Extracting");

    let session = connect(cli, signal).await?;
    let response = session.client.extract(&payload, &session.options).await?;

    if wants_json(cli) {
        return print_json(&response, cli);
    }
    println!("{}", TextFormatter::new(!cli.no_color).format_extract(&response));
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
