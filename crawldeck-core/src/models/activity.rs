//! Activity records.

use serde::{Deserialize, Serialize};

use super::JsonObject;

/// A job or queue record shown on the activity view.
///
/// `source` is only set when the record was synthesized from a legacy
/// endpoint and names that endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    /// Record identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Job identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Kind of work (`crawl`, `queue`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Target URL or description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Legacy endpoint this record was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl ActivityItem {
    /// Returns true if this record came from a legacy endpoint.
    pub fn is_legacy(&self) -> bool {
        self.source.is_some()
    }

    /// Best identifier for display.
    pub fn display_id(&self) -> &str {
        self.id
            .as_deref()
            .or(self.job_id.as_deref())
            .unwrap_or("-")
    }
}
