//! Client configuration and per-call options.

use std::time::Duration;

use crate::cancel::CancelSignal;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Client Config
// ============================================================================

/// Connection settings for one client instance.
///
/// Values are normalized on construction: the base URL never ends in `/`
/// and a blank API key is treated as absent.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
}

impl ClientConfig {
    /// Creates a config for the given base URL without an API key.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Creates a config from possibly unnormalized settings values.
    pub fn from_parts(base_url: impl AsRef<str>, api_key: Option<&str>) -> Self {
        let config = Self::new(base_url);
        match api_key {
            Some(key) => config.with_api_key(key),
            None => config,
        }
    }

    /// Sets the API key. Blank keys clear it.
    pub fn with_api_key(mut self, api_key: impl AsRef<str>) -> Self {
        let trimmed = api_key.as_ref().trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Trimmed API key, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns true if requests will carry an `Authorization` header.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL for an absolute path such as `/v2/health`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// Request Options
// ============================================================================

/// Per-call options: an external cancellation signal and a timeout.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Caller's cancellation signal.
    pub signal: Option<CancelSignal>,
    /// Per-request timeout. `None` means [`DEFAULT_TIMEOUT`]; zero disables it.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options with the default timeout and no signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a cancellation signal.
    pub fn with_signal(mut self, signal: CancelSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the per-request timeout in milliseconds; 0 disables it.
    pub fn with_timeout_ms(self, millis: u64) -> Self {
        self.with_timeout(Duration::from_millis(millis))
    }

    /// Disables the deadline timer.
    pub fn without_timeout(self) -> Self {
        self.with_timeout(Duration::ZERO)
    }

    /// Deadline to arm for each request, if any.
    pub fn effective_timeout(&self) -> Option<Duration> {
        match self.timeout {
            None => Some(DEFAULT_TIMEOUT),
            Some(timeout) if timeout.is_zero() => None,
            Some(timeout) => Some(timeout),
        }
    }

    /// Returns true if the caller's signal already fired.
    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(CancelSignal::is_cancelled)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let config = ClientConfig::new("https://example.dev/");
        assert_eq!(config.base_url(), "https://example.dev");
        assert_eq!(config.url("/v2/health"), "https://example.dev/v2/health");

        let config = ClientConfig::new("  https://example.dev//  ");
        assert_eq!(config.url("/v2/health"), "https://example.dev/v2/health");
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        assert!(!ClientConfig::new("https://a.dev").with_api_key("   ").has_api_key());
        assert!(!ClientConfig::from_parts("https://a.dev", Some("")).has_api_key());
        assert_eq!(
            ClientConfig::from_parts("https://a.dev", Some("  fc-key \n")).api_key(),
            Some("fc-key")
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("https://a.dev").with_api_key("secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_effective_timeout() {
        assert_eq!(RequestOptions::new().effective_timeout(), Some(DEFAULT_TIMEOUT));
        assert_eq!(RequestOptions::new().without_timeout().effective_timeout(), None);
        assert_eq!(
            RequestOptions::new().with_timeout_ms(250).effective_timeout(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_is_cancelled() {
        let signal = CancelSignal::new();
        let options = RequestOptions::new().with_signal(signal.clone());
        assert!(!options.is_cancelled());
        signal.cancel();
        assert!(options.is_cancelled());
        assert!(!RequestOptions::new().is_cancelled());
    }
}
