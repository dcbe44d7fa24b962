//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Local};
use crawldeck_core::{
    ActivityItem, Changelog, CrawlResponse, ExtractResponse, HealthResult, ScrapeResponse,
    SearchResponse, UsageSummary,
};
use crawldeck_fetch::ProbeAttempt;
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

// Long URLs are cut to keep the activity table on one line
const URL_WIDTH: usize = 48;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Set the progress bar width.
    #[cfg(test)]
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Formats a health result.
    pub fn format_health(&self, health: &HealthResult) -> String {
        let mut lines = Vec::new();

        let status = if health.is_ok() {
            self.green(&health.status)
        } else {
            self.yellow(&health.status)
        };
        lines.push(format!("Status:   {status}"));

        if let Some(version) = &health.version {
            lines.push(format!("Version:  {version}"));
        }
        if let Some(uptime) = health.uptime_seconds {
            lines.push(format!("Uptime:   {}", format_uptime(uptime)));
        }
        if let Some(endpoint) = health.checked_endpoint() {
            let via = if health.used_fallback() {
                self.yellow("fallback")
            } else {
                self.green("current API")
            };
            lines.push(format!("Endpoint: {} ({via})", self.cyan(endpoint)));
        }
        if let Some(note) = health.note() {
            lines.push(self.dim(note));
        }

        lines.join("\n")
    }

    /// Formats the endpoints a probe tried.
    pub fn format_attempts(&self, attempts: &[ProbeAttempt]) -> String {
        let mut lines = vec![self.dim("Probed:")];
        for attempt in attempts {
            let millis = attempt.duration.as_millis();
            match &attempt.error {
                None => lines.push(format!(
                    "  {} {:<16} {millis}ms",
                    self.green("✓"),
                    attempt.endpoint
                )),
                Some(error) => lines.push(format!(
                    "  {} {:<16} {millis}ms  {}",
                    self.red("✗"),
                    attempt.endpoint,
                    self.dim(&error.to_string())
                )),
            }
        }
        lines.join("\n")
    }

    // ========================================================================
    // Activity
    // ========================================================================

    /// Formats activity records as a table, newest first as returned.
    pub fn format_activity(&self, items: &[ActivityItem], limit: Option<usize>) -> String {
        if items.is_empty() {
            return self.dim("No recent activity");
        }

        let mut lines = vec![format!(
            "{:<26} {:<8} {:<12} {:<width$} {}",
            self.bold("ID"),
            self.bold("Type"),
            self.bold("Status"),
            self.bold("URL"),
            self.bold("Updated"),
            width = URL_WIDTH
        )];

        let shown = limit.unwrap_or(items.len()).min(items.len());
        for item in &items[..shown] {
            let status = item.status.as_deref().unwrap_or("-");
            let updated = item
                .updated_at
                .as_deref()
                .or(item.created_at.as_deref())
                .map_or_else(|| "-".to_string(), format_timestamp);

            lines.push(format!(
                "{:<26} {:<8} {:<12} {:<width$} {}",
                truncate(item.display_id(), 26),
                item.kind.as_deref().unwrap_or("-"),
                self.color_for_status(status),
                truncate(item.url.as_deref().unwrap_or("-"), URL_WIDTH),
                self.dim(&updated),
                width = URL_WIDTH
            ));
        }

        if shown < items.len() {
            lines.push(self.dim(&format!("... and {} more", items.len() - shown)));
        }
        if items.iter().any(ActivityItem::is_legacy) {
            lines.push(self.dim("(from legacy endpoints)"));
        }

        lines.join("\n")
    }

    // ========================================================================
    // Usage
    // ========================================================================

    /// Formats a usage summary with remaining-quota bars.
    pub fn format_usage(&self, usage: &UsageSummary) -> String {
        let mut lines = Vec::new();

        if let Some(plan) = &usage.plan {
            lines.push(format!("Plan:    {}", self.bold(plan)));
        }

        match usage.credits_used_percent() {
            Some(used) => lines.push(self.format_quota(
                "Credits",
                100.0 - used,
                usage.credits_remaining,
                usage.credits_plan,
            )),
            None => {
                if let Some(remaining) = usage.credits_remaining {
                    lines.push(format!("Credits: {} left", self.format_number(remaining)));
                }
            }
        }
        if let Some(period) = self.format_period(
            usage.credits_period_start.as_deref(),
            usage.credits_period_end.as_deref(),
        ) {
            lines.push(format!("         {}", self.dim(&period)));
        }

        match usage.tokens_used_percent() {
            Some(used) => lines.push(self.format_quota(
                "Tokens",
                100.0 - used,
                usage.tokens_remaining,
                usage.tokens_plan,
            )),
            None => {
                if let Some(remaining) = usage.tokens_remaining {
                    lines.push(format!("Tokens:  {} left", self.format_number(remaining)));
                }
            }
        }
        if let Some(period) = self.format_period(
            usage.tokens_period_start.as_deref(),
            usage.tokens_period_end.as_deref(),
        ) {
            lines.push(format!("         {}", self.dim(&period)));
        }

        if let Some(period) = &usage.period {
            lines.push(format!("Period:  {period}"));
        }
        if lines.is_empty() {
            lines.push(self.dim("No usage reported"));
        }
        if let Some(source) = &usage.source {
            lines.push(self.dim(&format!("(from {source})")));
        }

        lines.join("\n")
    }

    fn format_quota(
        &self,
        label: &str,
        percent_remaining: f64,
        remaining: Option<f64>,
        plan: Option<f64>,
    ) -> String {
        let bar = self.progress_bar(percent_remaining);
        let pct = self.color_for_percent(
            percent_remaining,
            &format!("{percent_remaining:.0}% left"),
        );
        let mut line = format!("{:<8} {bar} {pct}", format!("{label}:"));
        if let (Some(remaining), Some(plan)) = (remaining, plan) {
            line.push_str(&self.dim(&format!(
                " ({} / {})",
                self.format_number(remaining),
                self.format_number(plan)
            )));
        }
        line
    }

    fn format_period(&self, start: Option<&str>, end: Option<&str>) -> Option<String> {
        match (start, end) {
            (Some(start), Some(end)) => Some(format!(
                "{} to {}",
                format_timestamp(start),
                format_timestamp(end)
            )),
            (None, Some(end)) => Some(format!("until {}", format_timestamp(end))),
            (Some(start), None) => Some(format!("since {}", format_timestamp(start))),
            (None, None) => None,
        }
    }

    /// Progress bar filled in proportion to the remaining share.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let ratio = (percent_remaining / 100.0).clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let filled = (ratio * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    // ========================================================================
    // Changelog
    // ========================================================================

    /// Formats the changelog.
    pub fn format_changelog(&self, changelog: &Changelog) -> String {
        if changelog.is_empty() {
            return self.dim("No changelog entries");
        }
        changelog
            .lines()
            .into_iter()
            .map(|line| {
                if line.starts_with(' ') || line.starts_with('-') {
                    line
                } else {
                    self.bold(&line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    /// Formats a scrape result, preferring the markdown body.
    pub fn format_scrape(&self, response: &ScrapeResponse) -> String {
        let data = response.data.as_ref();
        if let Some(markdown) = data.and_then(|d| d.get("markdown")).and_then(Value::as_str) {
            return markdown.to_string();
        }
        if let Some(data) = data {
            return pretty(data);
        }
        response
            .message
            .clone()
            .unwrap_or_else(|| self.dim("Empty response"))
    }

    /// Formats search hits.
    pub fn format_search(&self, response: &SearchResponse) -> String {
        let Some(results) = response.results.as_ref().filter(|r| !r.is_empty()) else {
            return match &response.data {
                Some(data) => pretty(data),
                None => self.dim("No results"),
            };
        };

        let mut lines = Vec::new();
        for (index, hit) in results.iter().enumerate() {
            let title = hit.title.as_deref().unwrap_or(&hit.url);
            lines.push(format!("{}. {}", index + 1, self.bold(title)));
            lines.push(format!("   {}", self.cyan(&hit.url)));
            if let Some(snippet) = &hit.snippet {
                lines.push(format!("   {}", self.dim(snippet)));
            }
        }
        lines.join("\n")
    }

    /// Formats a crawl submission.
    pub fn format_crawl(&self, response: &CrawlResponse) -> String {
        let mut lines = Vec::new();
        match &response.job_id {
            Some(id) => lines.push(format!("Crawl started: {}", self.cyan(id))),
            None => lines.push("Crawl submitted".to_string()),
        }
        if let Some(status) = &response.status {
            lines.push(format!("Status: {}", self.color_for_status(status)));
        }
        if let Some(message) = &response.message {
            lines.push(self.dim(message));
        }
        lines.join("\n")
    }

    /// Formats an extraction result.
    pub fn format_extract(&self, response: &ExtractResponse) -> String {
        if let Some(data) = &response.data {
            return pretty(data);
        }
        match (&response.job_id, &response.message) {
            (Some(id), _) => format!("Extraction started: {}", self.cyan(id)),
            (None, Some(message)) => message.clone(),
            (None, None) => self.dim("Empty response"),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// Formats a section header.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}\n{}", self.bold(title), "─".repeat(50))
    }

    /// Formats an error message.
    pub fn format_error(&self, label: &str, error: &str) -> String {
        format!("{}: {} - {}", self.bold(label), self.red("Error"), error)
    }

    /// Formats the notice for an operation the server lacks.
    pub fn format_unsupported(&self, label: &str) -> String {
        format!("{}: {}", self.bold(label), self.dim("Not supported by this server"))
    }

    /// Dims a placeholder line.
    pub fn format_placeholder(&self, text: &str) -> String {
        self.dim(text)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn color_for_status(&self, status: &str) -> String {
        match status.to_lowercase().as_str() {
            "completed" | "success" | "done" => self.green(status),
            "failed" | "error" | "cancelled" => self.red(status),
            "active" | "scraping" | "queue" | "waiting" => self.yellow(status),
            _ => status.to_string(),
        }
    }

    fn format_number(&self, n: f64) -> String {
        if n >= 1_000_000.0 {
            format!("{:.1}M", n / 1_000_000.0)
        } else if n >= 1_000.0 {
            format!("{:.1}K", n / 1_000.0)
        } else {
            format!("{n:.0}")
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Formats seconds as the two most significant units.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (days, hours, mins) = (total / 86_400, (total % 86_400) / 3_600, (total % 3_600) / 60);

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m {}s", total % 60)
    } else {
        format!("{total}s")
    }
}

/// Local time for RFC 3339 stamps; anything else is shown as-is.
fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// ============================================================================
// Tests
// ============================================================================
