//! Response normalization.
//!
//! Endpoints answer in shapes that vary by server version. Each function
//! here maps one such shape onto the model types, reading every field
//! through a type-checked accessor so a missing or mistyped field yields
//! `None` rather than an error.

use crawldeck_core::{ActivityItem, HealthResult, JsonObject, UsageSummary};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Provenance tag for records built from the active crawl listing.
pub const ACTIVE_CRAWLS_SOURCE: &str = "v1/crawl/active";

/// Provenance tag for the record built from the queue snapshot.
pub const QUEUE_STATUS_SOURCE: &str = "v1/team/queue-status";

/// Provenance tag for summaries built from the credit/token endpoints.
pub const LEGACY_USAGE_SOURCE: &str = "v1/team/usage";

/// Plan name reported for legacy-derived usage.
pub const SELF_HOSTED_PLAN: &str = "self-hosted";

/// Identifier of the synthesized queue record.
pub const QUEUE_RECORD_ID: &str = "queue-status";

// ============================================================================
// Accessors
// ============================================================================

/// String field, accepting numbers as their decimal text.
fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First of `keys` holding a usable string.
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(value, key))
}

fn number(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

/// Object field, or an empty object.
fn object(value: &Value, key: &str) -> JsonObject {
    value
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Fields of `value` not listed in `known`.
fn unmodeled(value: &Value, known: &[&str]) -> JsonObject {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(key, _)| !known.contains(&key.as_str()))
                .map(|(key, field)| (key.clone(), field.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// True unless the body explicitly reports `success: false`.
fn not_failed(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) != Some(false)
}

/// Decodes a response into a typed value.
///
/// # Errors
///
/// Returns `ClientError::Serialization` if the shape does not match.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    Ok(serde_json::from_value(value)?)
}

// ============================================================================
// Health
// ============================================================================

/// Reads a `/v2/health` body.
///
/// Any 2xx body is a valid answer; a missing or non-string `status` reads
/// as `"unknown"` and a non-object `info` as empty.
pub fn current_health(value: &Value) -> HealthResult {
    let mut health = text(value, "status").map_or_else(HealthResult::default, HealthResult::new);
    health.version = text(value, "version");
    health.uptime_seconds = number(value, "uptime");
    health.info = object(value, "info");
    health
}

/// Reads the production flag from `/is-production`, if it is a boolean.
pub fn production_flag(value: &Value) -> Option<bool> {
    value.get("isProduction").and_then(Value::as_bool)
}

/// Builds the `"ok"` result a legacy health probe synthesizes.
pub fn probe_health(endpoint: &str, note: &str, mut extra: JsonObject) -> HealthResult {
    extra.insert(crawldeck_core::NOTE_KEY.to_string(), Value::from(note));
    HealthResult::ok().with_probe(endpoint, true, extra)
}

// ============================================================================
// Activity
// ============================================================================

const ACTIVITY_FIELDS: &[&str] = &[
    "id", "jobId", "type", "status", "url", "createdAt", "updatedAt", "source",
];

/// Reads the current activity listing.
///
/// Accepts a bare array or an object wrapping it under `data`. An empty
/// object (empty body) is an empty listing. Entries that are not objects
/// are skipped.
///
/// # Errors
///
/// Returns `ClientError::Serialization` for any other shape.
pub fn activity_items(value: Value) -> Result<Vec<ActivityItem>, ClientError> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(entries)) => entries,
            None if map.is_empty() => return Ok(Vec::new()),
            _ => return Err(ClientError::serialization("activity listing is not an array")),
        },
        _ => return Err(ClientError::serialization("activity listing is not an array")),
    };

    Ok(entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(current_activity)
        .collect())
}

fn current_activity(entry: &Value) -> ActivityItem {
    ActivityItem {
        id: text(entry, "id"),
        job_id: text(entry, "jobId"),
        kind: text(entry, "type"),
        status: text(entry, "status"),
        url: text(entry, "url"),
        created_at: text(entry, "createdAt"),
        updated_at: text(entry, "updatedAt"),
        source: text(entry, "source"),
        extra: unmodeled(entry, ACTIVITY_FIELDS),
    }
}

/// Normalizes the `/v1/crawl/active` listing.
///
/// Returns nothing if the body reports failure or has no `crawls` array.
pub fn legacy_crawls(value: &Value) -> Vec<ActivityItem> {
    if !not_failed(value) {
        return Vec::new();
    }
    let Some(crawls) = value.get("crawls").and_then(Value::as_array) else {
        return Vec::new();
    };
    crawls.iter().map(legacy_crawl).collect()
}

fn legacy_crawl(crawl: &Value) -> ActivityItem {
    let id = first_text(crawl, &["id", "jobId"]);
    let created_at = first_text(crawl, &["createdAt", "created_at"]);
    let updated_at = first_text(crawl, &["updatedAt", "updated_at"]).or_else(|| created_at.clone());

    ActivityItem {
        job_id: id.clone(),
        id,
        kind: Some("crawl".to_string()),
        status: Some("active".to_string()),
        url: text(crawl, "url"),
        created_at,
        updated_at,
        source: Some(ACTIVE_CRAWLS_SOURCE.to_string()),
        ..ActivityItem::default()
    }
}

/// Normalizes the `/v1/team/queue-status` snapshot into one queue record.
///
/// Returns `None` if the body reports failure.
pub fn legacy_queue(value: &Value) -> Option<ActivityItem> {
    if !not_failed(value) {
        return None;
    }

    let mut parts = Vec::new();
    if let Some(active) = count(value, "activeJobsInQueue") {
        parts.push(format!("{active} active"));
    }
    if let Some(waiting) = count(value, "waitingJobsInQueue") {
        parts.push(format!("{waiting} waiting"));
    }
    let status = if parts.is_empty() {
        "snapshot".to_string()
    } else {
        parts.join(" / ")
    };
    let last_success = text(value, "mostRecentSuccess");

    Some(ActivityItem {
        id: Some(QUEUE_RECORD_ID.to_string()),
        job_id: None,
        kind: Some("queue".to_string()),
        status: Some(status),
        url: Some("team queue status".to_string()),
        created_at: last_success.clone(),
        updated_at: last_success,
        source: Some(QUEUE_STATUS_SOURCE.to_string()),
        extra: JsonObject::new(),
    })
}

/// Queue count rendered without a fractional part when it is whole.
fn count(value: &Value, key: &str) -> Option<String> {
    let raw = value.get(key)?;
    if let Some(n) = raw.as_i64() {
        return Some(n.to_string());
    }
    raw.as_f64().map(|n| n.to_string())
}

// ============================================================================
// Usage
// ============================================================================

const USAGE_FIELDS: &[&str] = &[
    "plan",
    "creditsRemaining",
    "creditsUsed",
    "creditsPlan",
    "creditsPeriodStart",
    "creditsPeriodEnd",
    "tokensRemaining",
    "tokensPlan",
    "tokensPeriodStart",
    "tokensPeriodEnd",
    "period",
    "source",
];

/// Reads a `/v2/usage` body. Mistyped fields read as absent.
pub fn current_usage(value: &Value) -> UsageSummary {
    UsageSummary {
        plan: text(value, "plan"),
        credits_remaining: number(value, "creditsRemaining"),
        credits_used: number(value, "creditsUsed"),
        credits_plan: number(value, "creditsPlan"),
        credits_period_start: text(value, "creditsPeriodStart"),
        credits_period_end: text(value, "creditsPeriodEnd"),
        tokens_remaining: number(value, "tokensRemaining"),
        tokens_plan: number(value, "tokensPlan"),
        tokens_period_start: text(value, "tokensPeriodStart"),
        tokens_period_end: text(value, "tokensPeriodEnd"),
        period: text(value, "period"),
        source: text(value, "source"),
        extra: unmodeled(value, USAGE_FIELDS),
    }
}

/// Merges the legacy credit and token responses into one summary.
///
/// Either source may be absent. A source contributes only if it does not
/// report `success: false` and carries a `data` object.
pub fn legacy_usage(credits: Option<&Value>, tokens: Option<&Value>) -> UsageSummary {
    let mut summary = UsageSummary {
        plan: Some(SELF_HOSTED_PLAN.to_string()),
        source: Some(LEGACY_USAGE_SOURCE.to_string()),
        ..UsageSummary::default()
    };

    if let Some(data) = credits.and_then(usage_data) {
        summary.credits_remaining = number(data, "remaining_credits");
        summary.credits_plan = number(data, "plan_credits");
        summary.credits_period_start = text(data, "billing_period_start");
        summary.credits_period_end = text(data, "billing_period_end");
    }

    if let Some(data) = tokens.and_then(usage_data) {
        summary.tokens_remaining = number(data, "remaining_tokens");
        summary.tokens_plan = number(data, "plan_tokens");
        summary.tokens_period_start = text(data, "billing_period_start");
        summary.tokens_period_end = text(data, "billing_period_end");
    }

    summary
}

fn usage_data(value: &Value) -> Option<&Value> {
    if !not_failed(value) {
        return None;
    }
    value.get("data").filter(|data| data.is_object())
}

// ============================================================================
// Tests
// ============================================================================
