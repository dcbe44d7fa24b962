//! Probe steps for each probed operation.
//!
//! | Operation | Current | Legacy (in order) |
//! |-----------|---------|-------------------|
//! | health | `/v2/health` | `/is-production`, `/test`, `/` |
//! | activity | `/v2/activity` | `/v1/crawl/active` + `/v1/team/queue-status` |
//! | usage | `/v2/usage` | `/v1/team/credit-usage` + `/v1/team/token-usage` |
//!
//! Health probing is about reachability, so every health step moves on
//! after any failure except cancellation. Activity and usage only leave
//! the current endpoint on 404, and their legacy step consults both
//! sources one after the other, tolerating a 404 from either.

use async_trait::async_trait;
use crawldeck_core::{ActivityItem, HealthResult, JsonObject, UsageSummary};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RequestOptions;
use crate::error::ClientError;
use crate::normalize;
use crate::probe::{CurrentEndpoint, ProbeChain, ProbeStep};
use crate::transport::Transport;

/// Current health endpoint.
pub const HEALTH_PATH: &str = "/v2/health";
/// Current activity endpoint.
pub const ACTIVITY_PATH: &str = "/v2/activity";
/// Current usage endpoint.
pub const USAGE_PATH: &str = "/v2/usage";

const PRODUCTION_PATH: &str = "/is-production";
const TEST_PATH: &str = "/test";
const ROOT_PATH: &str = "/";
const ACTIVE_CRAWLS_PATH: &str = "/v1/crawl/active";
const QUEUE_STATUS_PATH: &str = "/v1/team/queue-status";
const CREDIT_USAGE_PATH: &str = "/v1/team/credit-usage";
const TOKEN_USAGE_PATH: &str = "/v1/team/token-usage";

// ============================================================================
// Chains
// ============================================================================

/// Health: current endpoint, production flag, `/test`, root.
pub fn health_chain() -> ProbeChain<HealthResult> {
    ProbeChain::new(
        "health",
        vec![
            Box::new(CurrentHealth),
            Box::new(ProductionFlag),
            Box::new(Reachability {
                path: TEST_PATH,
                note: "GET /test succeeded; server lacks /v2/health but is reachable.",
            }),
            Box::new(Reachability {
                path: ROOT_PATH,
                note: "Root endpoint responded; consider enabling /v2/health for detailed status.",
            }),
        ],
    )
}

/// Activity: current endpoint, then the merged legacy sources.
pub fn activity_chain() -> ProbeChain<Vec<ActivityItem>> {
    ProbeChain::new(
        "activity",
        vec![
            Box::new(CurrentEndpoint::new(ACTIVITY_PATH, normalize::activity_items)),
            Box::new(LegacyActivity),
        ],
    )
}

/// Usage: current endpoint, then the merged legacy sources.
pub fn usage_chain() -> ProbeChain<UsageSummary> {
    ProbeChain::new(
        "usage",
        vec![
            Box::new(CurrentEndpoint::new(USAGE_PATH, |value| {
                Ok(normalize::current_usage(&value))
            })),
            Box::new(LegacyUsage),
        ],
    )
}

/// Maps a 404 to `None` so an absent legacy source can be skipped.
fn optional_source(
    path: &str,
    result: Result<Value, ClientError>,
) -> Result<Option<Value>, ClientError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_not_found() => {
            debug!(path, "Legacy source absent");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Health steps move on after any failure. Cancellation never gets here.
fn continue_health(path: &str, error: &ClientError) -> bool {
    if error.is_absent_endpoint() {
        debug!(path, "Health endpoint absent");
    } else {
        warn!(path, error = %error, "Health endpoint failed, probing further");
    }
    true
}

// ============================================================================
// Health Steps
// ============================================================================

struct CurrentHealth;

#[async_trait]
impl ProbeStep<HealthResult> for CurrentHealth {
    fn endpoint(&self) -> &'static str {
        HEALTH_PATH
    }

    async fn probe(
        &self,
        transport: &Transport,
        options: &RequestOptions,
    ) -> Result<HealthResult, ClientError> {
        let value = transport.get(HEALTH_PATH, options).await?;
        Ok(normalize::current_health(&value).with_probe(HEALTH_PATH, false, JsonObject::new()))
    }

    fn should_continue(&self, error: &ClientError) -> bool {
        continue_health(HEALTH_PATH, error)
    }
}

struct ProductionFlag;

#[async_trait]
impl ProbeStep<HealthResult> for ProductionFlag {
    fn endpoint(&self) -> &'static str {
        PRODUCTION_PATH
    }

    async fn probe(
        &self,
        transport: &Transport,
        options: &RequestOptions,
    ) -> Result<HealthResult, ClientError> {
        let value = transport.get(PRODUCTION_PATH, options).await?;

        let mut extra = JsonObject::new();
        if let Some(flag) = normalize::production_flag(&value) {
            extra.insert("isProduction".to_string(), Value::Bool(flag));
        }
        Ok(normalize::probe_health(
            PRODUCTION_PATH,
            "GET /is-production responded; inferring health from self-host endpoint.",
            extra,
        ))
    }

    fn should_continue(&self, error: &ClientError) -> bool {
        continue_health(PRODUCTION_PATH, error)
    }
}

/// Any 2xx from `path` counts as healthy, whatever the body.
struct Reachability {
    path: &'static str,
    note: &'static str,
}

#[async_trait]
impl ProbeStep<HealthResult> for Reachability {
    fn endpoint(&self) -> &'static str {
        self.path
    }

    async fn probe(
        &self,
        transport: &Transport,
        options: &RequestOptions,
    ) -> Result<HealthResult, ClientError> {
        transport.get(self.path, options).await?;
        Ok(normalize::probe_health(self.path, self.note, JsonObject::new()))
    }

    fn should_continue(&self, error: &ClientError) -> bool {
        continue_health(self.path, error)
    }
}

// ============================================================================
// Activity Steps
// ============================================================================

struct LegacyActivity;

#[async_trait]
impl ProbeStep<Vec<ActivityItem>> for LegacyActivity {
    fn endpoint(&self) -> &'static str {
        ACTIVE_CRAWLS_PATH
    }

    async fn probe(
        &self,
        transport: &Transport,
        options: &RequestOptions,
    ) -> Result<Vec<ActivityItem>, ClientError> {
        let crawls = optional_source(
            ACTIVE_CRAWLS_PATH,
            transport.get(ACTIVE_CRAWLS_PATH, options).await,
        )?;
        let queue = optional_source(
            QUEUE_STATUS_PATH,
            transport.get(QUEUE_STATUS_PATH, options).await,
        )?;

        let mut items = crawls.as_ref().map(normalize::legacy_crawls).unwrap_or_default();
        let queue = queue.as_ref().and_then(normalize::legacy_queue);

        if items.is_empty() && queue.is_none() {
            return Err(ClientError::not_found("Legacy activity endpoints unavailable"));
        }
        items.extend(queue);
        Ok(items)
    }
}

// ============================================================================
// Usage Steps
// ============================================================================

struct LegacyUsage;

#[async_trait]
impl ProbeStep<UsageSummary> for LegacyUsage {
    fn endpoint(&self) -> &'static str {
        CREDIT_USAGE_PATH
    }

    async fn probe(
        &self,
        transport: &Transport,
        options: &RequestOptions,
    ) -> Result<UsageSummary, ClientError> {
        let credits = optional_source(
            CREDIT_USAGE_PATH,
            transport.get(CREDIT_USAGE_PATH, options).await,
        )?;
        let tokens = optional_source(
            TOKEN_USAGE_PATH,
            transport.get(TOKEN_USAGE_PATH, options).await,
        )?;

        if credits.is_none() && tokens.is_none() {
            return Err(ClientError::not_found("Legacy usage endpoints unavailable"));
        }
        Ok(normalize::legacy_usage(credits.as_ref(), tokens.as_ref()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_chain_order() {
        assert_eq!(
            health_chain().endpoints(),
            vec!["/v2/health", "/is-production", "/test", "/"]
        );
    }

    #[test]
    fn test_activity_and_usage_chains() {
        assert_eq!(activity_chain().endpoints(), vec!["/v2/activity", "/v1/crawl/active"]);
        assert_eq!(usage_chain().endpoints(), vec!["/v2/usage", "/v1/team/credit-usage"]);
    }

    #[test]
    fn test_health_continues_after_any_failure() {
        assert!(continue_health(HEALTH_PATH, &ClientError::http(405, "Method Not Allowed", None)));
        assert!(continue_health(HEALTH_PATH, &ClientError::http(500, "boom", None)));
        assert!(continue_health(TEST_PATH, &ClientError::Timeout));
    }

    #[test]
    fn test_optional_source_only_skips_404() {
        assert!(matches!(
            optional_source("/x", Err(ClientError::not_found("gone"))),
            Ok(None)
        ));
        assert!(optional_source("/x", Err(ClientError::Timeout)).is_err());
        assert!(optional_source("/x", Ok(Value::Null)).unwrap().is_some());
    }
}
