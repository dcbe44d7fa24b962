//! Client facade.
//!
//! One method per remote operation. Each fixes the path, method and
//! payload/response types, then hands off to the [`Transport`] or to a
//! [`ProbeChain`].

use std::sync::Arc;

use crawldeck_core::{
    ActivityItem, Changelog, CrawlPayload, CrawlResponse, ExtractPayload, ExtractResponse,
    HealthResult, ScrapePayload, ScrapeResponse, SearchPayload, SearchResponse, UsageSummary,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::{ClientConfig, RequestOptions};
use crate::error::ClientError;
use crate::host::{HttpSend, ReqwestSender, Timer, TokioTimer};
use crate::legacy::{activity_chain, health_chain, usage_chain};
use crate::normalize;
use crate::probe::{ProbeChain, ProbeOutcome};
use crate::transport::Transport;

const SCRAPE_PATH: &str = "/v2/scrape";
const SEARCH_PATH: &str = "/v2/search";
const CRAWL_PATH: &str = "/v2/crawl";
const EXTRACT_PATH: &str = "/v2/extract";
const CHANGELOG_PATH: &str = "/v2/changelog";

/// Client for one self-hosted scraping server.
///
/// Holds no per-call state; concurrent calls are independent. Cloning is
/// cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct CrawlClient {
    transport: Transport,
    health: Arc<ProbeChain<HealthResult>>,
    activity: Arc<ProbeChain<Vec<ActivityItem>>>,
    usage: Arc<ProbeChain<UsageSummary>>,
}

impl CrawlClient {
    /// Creates a client backed by reqwest and the tokio clock.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let sender = ReqwestSender::new()?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(sender),
            Arc::new(TokioTimer),
        ))
    }

    /// Creates a client with explicit network and timer collaborators.
    pub fn with_collaborators(
        config: ClientConfig,
        sender: Arc<dyn HttpSend>,
        timer: Arc<dyn Timer>,
    ) -> Self {
        Self {
            transport: Transport::new(config, sender, timer),
            health: Arc::new(health_chain()),
            activity: Arc::new(activity_chain()),
            usage: Arc::new(usage_chain()),
        }
    }

    /// Connection settings.
    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // ------------------------------------------------------------------------
    // Probed operations
    // ------------------------------------------------------------------------

    /// Checks server health, falling back to legacy reachability probes.
    ///
    /// The result's `info` records the endpoint that answered and whether
    /// it was a fallback.
    ///
    /// # Errors
    ///
    /// Returns the last failure if no endpoint answered, or `Cancelled`.
    #[instrument(skip(self, options))]
    pub async fn health(&self, options: &RequestOptions) -> Result<HealthResult, ClientError> {
        self.health_detailed(options).await.into_result()
    }

    /// Like [`CrawlClient::health`], keeping every attempt made.
    pub async fn health_detailed(&self, options: &RequestOptions) -> ProbeOutcome<HealthResult> {
        self.health.execute(&self.transport, options).await
    }

    /// Lists recent jobs, synthesizing records from legacy endpoints when
    /// the server has no `/v2/activity`.
    ///
    /// # Errors
    ///
    /// A 404 means neither surface exists. Other failures propagate
    /// unchanged.
    #[instrument(skip(self, options))]
    pub async fn activity(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<ActivityItem>, ClientError> {
        self.activity
            .execute(&self.transport, options)
            .await
            .into_result()
    }

    /// Reports quota usage, merging legacy credit and token usage when the
    /// server has no `/v2/usage`.
    ///
    /// # Errors
    ///
    /// A 404 means neither surface exists. Other failures propagate
    /// unchanged.
    #[instrument(skip(self, options))]
    pub async fn usage(&self, options: &RequestOptions) -> Result<UsageSummary, ClientError> {
        self.usage.execute(&self.transport, options).await.into_result()
    }

    // ------------------------------------------------------------------------
    // Direct operations
    // ------------------------------------------------------------------------

    /// Scrapes a single page.
    ///
    /// # Errors
    ///
    /// Any transport failure, unchanged.
    pub async fn scrape(
        &self,
        payload: &ScrapePayload,
        options: &RequestOptions,
    ) -> Result<ScrapeResponse, ClientError> {
        self.post(SCRAPE_PATH, payload, options).await
    }

    /// Runs a web search.
    ///
    /// # Errors
    ///
    /// Any transport failure, unchanged.
    pub async fn search(
        &self,
        payload: &SearchPayload,
        options: &RequestOptions,
    ) -> Result<SearchResponse, ClientError> {
        self.post(SEARCH_PATH, payload, options).await
    }

    /// Starts a crawl. The response usually carries a job id.
    ///
    /// # Errors
    ///
    /// Any transport failure, unchanged.
    pub async fn crawl(
        &self,
        payload: &CrawlPayload,
        options: &RequestOptions,
    ) -> Result<CrawlResponse, ClientError> {
        self.post(CRAWL_PATH, payload, options).await
    }

    /// Runs a structured extraction.
    ///
    /// # Errors
    ///
    /// Any transport failure, unchanged.
    pub async fn extract(
        &self,
        payload: &ExtractPayload,
        options: &RequestOptions,
    ) -> Result<ExtractResponse, ClientError> {
        self.post(EXTRACT_PATH, payload, options).await
    }

    /// Fetches the server changelog.
    ///
    /// # Errors
    ///
    /// A 404 is returned as-is; callers decide what absence means.
    #[instrument(skip(self, options))]
    pub async fn changelog(&self, options: &RequestOptions) -> Result<Changelog, ClientError> {
        let value = self.transport.get(CHANGELOG_PATH, options).await?;
        normalize::decode(value)
    }

    #[instrument(skip(self, payload, options))]
    async fn post<P, R>(&self, path: &str, payload: &P, options: &RequestOptions) -> Result<R, ClientError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(payload)?;
        let value = self.transport.post(path, &body, options).await?;
        normalize::decode(value)
    }
}

impl std::fmt::Debug for CrawlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlClient")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}
