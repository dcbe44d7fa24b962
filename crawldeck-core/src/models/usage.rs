//! Usage summary.

use serde::{Deserialize, Serialize};

use super::JsonObject;

/// Snapshot of the team's quota.
///
/// The well-known keys are typed; anything else the server reports is kept
/// in `extra`. Legacy-derived summaries carry `plan: "self-hosted"` and a
/// `source`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Plan name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Credits left in the period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<f64>,
    /// Credits spent in the period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<f64>,
    /// Credits included in the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_plan: Option<f64>,
    /// Start of the credit billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_period_start: Option<String>,
    /// End of the credit billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_period_end: Option<String>,
    /// Tokens left in the period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_remaining: Option<f64>,
    /// Tokens included in the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_plan: Option<f64>,
    /// Start of the token billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_period_start: Option<String>,
    /// End of the token billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_period_end: Option<String>,
    /// Free-form period label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Legacy endpoint family this summary was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Unmodeled fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl UsageSummary {
    /// Percentage of plan credits already spent, when derivable.
    pub fn credits_used_percent(&self) -> Option<f64> {
        let plan = self.credits_plan.filter(|p| *p > 0.0)?;
        let used = self
            .credits_used
            .or_else(|| self.credits_remaining.map(|r| plan - r))?;
        Some((used / plan * 100.0).clamp(0.0, 100.0))
    }

    /// Percentage of plan tokens already spent, when derivable.
    pub fn tokens_used_percent(&self) -> Option<f64> {
        let plan = self.tokens_plan.filter(|p| *p > 0.0)?;
        let remaining = self.tokens_remaining?;
        Some(((plan - remaining) / plan * 100.0).clamp(0.0, 100.0))
    }

    /// Returns true if this summary was built from legacy endpoints.
    pub fn is_legacy(&self) -> bool {
        self.source.is_some()
    }
}
