//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use crawldeck_core::HealthResult;
use crawldeck_fetch::{ClientError, PollState, ProbeAttempt, ProbeOutcome};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// Health plus the endpoints that were probed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<&'a HealthResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOutput>,
    pub attempts: Vec<AttemptOutput>,
}

/// One probe step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutput {
    pub endpoint: String,
    pub ok: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOutput>,
}

/// A classified client failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

/// One polled section of the watch view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOutput<'a, T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOutput>,
    pub unsupported: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// One refresh of the watch view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOutput<'a, H, A, U> {
    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
    pub health: SectionOutput<'a, H>,
    pub activity: SectionOutput<'a, A>,
    pub usage: SectionOutput<'a, U>,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a health probe with every attempt made.
    pub fn format_health(&self, outcome: &ProbeOutcome<HealthResult>) -> Result<String> {
        let output = HealthOutput {
            health: outcome.result.as_ref().ok(),
            error: outcome.result.as_ref().err().map(Self::error_output),
            attempts: outcome.attempts.iter().map(Self::attempt_output).collect(),
        };
        self.format(&output)
    }

    /// Converts a client error to output.
    pub fn error_output(error: &ClientError) -> ErrorOutput {
        ErrorOutput {
            kind: error.kind().as_str().to_string(),
            status: error.status_code(),
            message: error.to_string(),
        }
    }

    fn attempt_output(attempt: &ProbeAttempt) -> AttemptOutput {
        AttemptOutput {
            endpoint: attempt.endpoint.to_string(),
            ok: attempt.succeeded(),
            duration_ms: u64::try_from(attempt.duration.as_millis()).unwrap_or(u64::MAX),
            error: attempt.error.as_ref().map(Self::error_output),
        }
    }

    /// Converts a poller snapshot to a watch section.
    pub fn section<T>(state: &PollState<T>) -> SectionOutput<'_, T> {
        SectionOutput {
            data: state.data.as_ref(),
            error: state.error.as_ref().map(Self::error_output),
            unsupported: state.is_unsupported(),
            last_updated: state.last_updated,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
