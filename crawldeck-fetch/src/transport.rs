//! Single-request transport.
//!
//! [`Transport::send`] executes exactly one request and yields either the
//! parsed JSON body or a classified [`ClientError`]. It never retries.
//!
//! Each request races three futures: the caller's cancellation signal, the
//! deadline timer and the send itself. The signal is polled first, so a
//! caller cancellation is never reported as a timeout.

use std::future::pending;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::{ClientConfig, RequestOptions};
use crate::error::ClientError;
use crate::host::{HttpRequest, HttpResponse, HttpSend, Method, Timer};

/// Issues requests against one configured server.
#[derive(Clone)]
pub struct Transport {
    config: ClientConfig,
    sender: Arc<dyn HttpSend>,
    timer: Arc<dyn Timer>,
}

impl Transport {
    /// Creates a transport from its collaborators.
    pub fn new(config: ClientConfig, sender: Arc<dyn HttpSend>, timer: Arc<dyn Timer>) -> Self {
        Self {
            config,
            sender,
            timer,
        }
    }

    /// Connection settings this transport uses.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a GET to `path`.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn get(&self, path: &str, options: &RequestOptions) -> Result<Value, ClientError> {
        self.send(path, Method::Get, None, options).await
    }

    /// Sends a POST with a JSON body to `path`.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        self.send(path, Method::Post, Some(body), options).await
    }

    /// Executes one request.
    ///
    /// `path` must start with `/` and is appended to the base URL verbatim.
    /// A body is only sent for methods that carry one.
    ///
    /// On 2xx returns the parsed body, or an empty object when the body is
    /// empty or not JSON.
    ///
    /// # Errors
    ///
    /// - `Cancelled` if the caller's signal fired, before or during the
    ///   request; no request is issued if it had already fired
    /// - `Timeout` if the deadline fired first
    /// - `Network` if no response was obtained
    /// - `Http` for any non-2xx status
    #[instrument(skip(self, body, options))]
    pub async fn send(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        if let Some(signal) = options.signal.as_ref().filter(|s| s.is_cancelled()) {
            debug!("Signal already fired, not sending");
            return Err(signal.to_error());
        }

        let request = self.build_request(path, method, body)?;
        debug!(url = %request.url, "Sending request");

        let cancelled = async {
            match &options.signal {
                Some(signal) => signal.cancelled().await,
                None => pending().await,
            }
        };
        let deadline = async {
            match options.effective_timeout() {
                Some(timeout) => self.timer.sleep(timeout).await,
                None => pending().await,
            }
        };

        let response = tokio::select! {
            biased;
            () = cancelled => {
                debug!("Request cancelled by caller");
                return Err(options
                    .signal
                    .as_ref()
                    .map_or_else(|| ClientError::cancelled(None), |s| s.to_error()));
            }
            () = deadline => {
                debug!("Request deadline fired");
                return Err(ClientError::Timeout);
            }
            result = self.sender.send(request) => result.map_err(|e| {
                debug!(error = %e, "Request failed before a response");
                ClientError::from(e)
            })?,
        };

        Self::classify(response)
    }

    fn build_request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ClientError> {
        let mut headers = HeaderMap::new();
        if method.carries_body() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(key) = self.config.api_key() {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| ClientError::network(format!("Invalid API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let body = match body {
            Some(value) if method.carries_body() => Some(serde_json::to_string(value)?),
            _ => None,
        };

        Ok(HttpRequest {
            method,
            url: self.config.url(path),
            headers,
            body,
        })
    }

    fn classify(response: HttpResponse) -> Result<Value, ClientError> {
        let status = response.status;
        let data = parse_body(&response.body);
        debug!(status, "Response received");

        if response.is_success() {
            return Ok(data.unwrap_or_else(|| Value::Object(serde_json::Map::new())));
        }

        let message = data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .map_or_else(
                || format!("Request failed with status {status}"),
                str::to_string,
            );
        Err(ClientError::http(status, message, data))
    }
}

/// Parses a body leniently: empty or malformed bodies yield `None`.
fn parse_body(body: &str) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, len = body.len(), "Failed to parse JSON response");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelSignal;
    use crate::error::ErrorKind;
    use crate::host::TokioTimer;
    use crate::testutil::{MockSender, Reply};
    use serde_json::json;
    use std::time::Duration;

    fn transport(base: &str, key: Option<&str>, sender: &MockSender) -> Transport {
        Transport::new(
            ClientConfig::from_parts(base, key),
            Arc::new(sender.clone()),
            Arc::new(TokioTimer),
        )
    }

    #[tokio::test]
    async fn test_url_and_auth_header() {
        let sender = MockSender::new().reply("/v2/health", Reply::json(200, json!({"status": "ok"})));
        let t = transport("https://example.dev/", Some(" test-key "), &sender);

        t.get("/v2/health", &RequestOptions::new()).await.unwrap();

        let calls = sender.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://example.dev/v2/health");
        assert_eq!(calls[0].method, Method::Get);
        assert_eq!(calls[0].headers.get(AUTHORIZATION).unwrap(), "Bearer test-key");
    }

    #[tokio::test]
    async fn test_blank_key_sends_no_auth() {
        let sender = MockSender::new().reply("/v2/usage", Reply::json(200, json!({})));
        let t = transport("https://api.local", Some("   "), &sender);

        t.get("/v2/usage", &RequestOptions::new()).await.unwrap();
        assert!(sender.calls()[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_get_has_no_body_or_content_type() {
        let sender = MockSender::new().reply("/v2/activity", Reply::json(200, json!([])));
        let t = transport("https://api.local", None, &sender);

        t.send("/v2/activity", Method::Get, Some(&json!({"ignored": true})), &RequestOptions::new())
            .await
            .unwrap();

        let call = &sender.calls()[0];
        assert!(call.body.is_none());
        assert!(call.headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_post_serializes_body() {
        let sender = MockSender::new().reply("/v2/scrape", Reply::json(200, json!({"data": "ok"})));
        let t = transport("https://api.local", None, &sender);

        let body = json!({"url": "https://example.com"});
        t.post("/v2/scrape", &body, &RequestOptions::new()).await.unwrap();

        let call = &sender.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.body.as_deref(), Some(r#"{"url":"https://example.com"}"#));
        assert_eq!(call.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_empty_success_body_is_empty_object() {
        let sender = MockSender::new().reply("/test", Reply::text(200, ""));
        let t = transport("https://api.local", None, &sender);

        let value = t.get("/test", &RequestOptions::new()).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_soft() {
        let sender = MockSender::new().reply("/", Reply::text(200, "OK"));
        let t = transport("https://api.local", None, &sender);

        let value = t.get("/", &RequestOptions::new()).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_error_message_from_body() {
        let sender =
            MockSender::new().reply("/v2/health", Reply::json(404, json!({"message": "Not found"})));
        let t = transport("https://api.local", None, &sender);

        let err = t.get("/v2/health", &RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.body(), Some(&json!({"message": "Not found"})));
    }

    #[tokio::test]
    async fn test_generic_error_message() {
        let sender = MockSender::new().reply("/v2/crawl", Reply::text(502, "<html>bad gateway</html>"));
        let t = transport("https://api.local", None, &sender);

        let err = t.post("/v2/crawl", &json!({}), &RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.to_string(), "Request failed with status 502");
        assert!(err.body().is_none());
    }

    #[tokio::test]
    async fn test_network_failure() {
        let sender = MockSender::new().reply("/v2/health", Reply::network("ECONNREFUSED"));
        let t = transport("https://api.local", None, &sender);

        let err = t.get("/v2/health", &RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_pre_cancelled_signal_sends_nothing() {
        let sender = MockSender::new().reply("/v2/health", Reply::json(200, json!({})));
        let t = transport("https://api.local", None, &sender);

        let signal = CancelSignal::new();
        signal.cancel_with_reason("page closed");
        let options = RequestOptions::new().with_signal(signal);

        let err = t.get("/v2/health", &options).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(err.cancel_reason(), Some("page closed"));
        assert!(sender.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_as_timeout() {
        let sender = MockSender::new().reply("/v2/scrape", Reply::Hang);
        let t = transport("https://api.local", None, &sender);

        let options = RequestOptions::new().with_timeout(Duration::from_millis(50));
        let err = t.post("/v2/scrape", &json!({}), &options).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.status_code(), Some(408));
        assert_eq!(err.to_string(), "Request timed out");
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_cancel_beats_deadline() {
        let sender = MockSender::new().reply("/v2/scrape", Reply::Hang);
        let t = transport("https://api.local", None, &sender);

        let signal = CancelSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel_with_reason("user pressed stop");
        });

        let options = RequestOptions::new()
            .with_signal(signal)
            .with_timeout(Duration::from_secs(1));
        let err = t.post("/v2/scrape", &json!({}), &options).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(err.cancel_reason(), Some("user pressed stop"));
        assert_eq!(sender.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_disables_deadline() {
        let sender = MockSender::new().reply(
            "/v2/extract",
            Reply::delayed(Duration::from_secs(120), 200, json!({"data": 1})),
        );
        let t = transport("https://api.local", None, &sender);

        let options = RequestOptions::new().without_timeout();
        let value = t.post("/v2/extract", &json!({}), &options).await.unwrap();
        assert_eq!(value, json!({"data": 1}));
    }
}
