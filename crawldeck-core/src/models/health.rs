//! Health check result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonObject;

/// Diagnostic key naming the endpoint that answered.
pub const CHECKED_ENDPOINT_KEY: &str = "checkedEndpoint";

/// Diagnostic key set to `true` when a legacy endpoint answered.
pub const FALLBACK_KEY: &str = "fallback";

/// Diagnostic key carrying a human-readable probe note.
pub const NOTE_KEY: &str = "note";

/// Result of a health check.
///
/// `info` holds whatever the server reported plus the diagnostics the client
/// attaches while probing (`checkedEndpoint`, `fallback`, `note`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResult {
    /// Reported status, `"ok"` when synthesized from a legacy probe.
    #[serde(default = "unknown_status")]
    pub status: String,
    /// Server version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Server uptime in seconds.
    #[serde(default, rename = "uptime", skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<f64>,
    /// Server-reported details and client diagnostics.
    #[serde(default)]
    pub info: JsonObject,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

impl HealthResult {
    /// Creates a result with the given status and no details.
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            version: None,
            uptime_seconds: None,
            info: JsonObject::new(),
        }
    }

    /// Creates an `"ok"` result.
    pub fn ok() -> Self {
        Self::new("ok")
    }

    /// Records which endpoint answered and whether it was a fallback.
    ///
    /// `extra` is merged into `info` first, so the diagnostics always win.
    pub fn with_probe(mut self, endpoint: &str, fallback: bool, extra: JsonObject) -> Self {
        self.info.extend(extra);
        self.info
            .insert(CHECKED_ENDPOINT_KEY.to_string(), Value::from(endpoint));
        self.info.insert(FALLBACK_KEY.to_string(), Value::Bool(fallback));
        self
    }

    /// Endpoint that answered, if recorded.
    pub fn checked_endpoint(&self) -> Option<&str> {
        self.info.get(CHECKED_ENDPOINT_KEY).and_then(Value::as_str)
    }

    /// Whether a legacy endpoint answered.
    pub fn used_fallback(&self) -> bool {
        self.info
            .get(FALLBACK_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Probe note, if any.
    pub fn note(&self) -> Option<&str> {
        self.info.get(NOTE_KEY).and_then(Value::as_str)
    }

    /// Returns true if the status reads as healthy.
    pub fn is_ok(&self) -> bool {
        matches!(
            self.status.to_lowercase().as_str(),
            "ok" | "healthy" | "up" | "operational"
        )
    }
}

impl Default for HealthResult {
    fn default() -> Self {
        Self::new(unknown_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_probe_overrides_extra() {
        let mut extra = JsonObject::new();
        extra.insert("fallback".to_string(), json!("spoofed"));
        extra.insert("note".to_string(), json!("hello"));

        let health = HealthResult::ok().with_probe("/test", true, extra);
        assert_eq!(health.checked_endpoint(), Some("/test"));
        assert!(health.used_fallback());
        assert_eq!(health.note(), Some("hello"));
    }

    #[test]
    fn test_deserialize_wire_uptime() {
        let health: HealthResult =
            serde_json::from_value(json!({"status": "ok", "uptime": 12.5})).unwrap();
        assert_eq!(health.uptime_seconds, Some(12.5));
        assert!(health.info.is_empty());
        assert!(health.is_ok());
    }

    #[test]
    fn test_missing_status_is_unknown() {
        let health: HealthResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(health.status, "unknown");
        assert!(!health.is_ok());
    }
}
