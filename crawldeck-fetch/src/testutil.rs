//! Test utilities: a scripted HTTP sender.
//!
//! Replies are queued per request path. Each call pops the front of its
//! path's queue; the last reply stays and answers every later call, so a
//! single scripted reply behaves like an unchanged server. Paths with no
//! script answer 404 with an empty body. Every request is recorded for
//! assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cancel::CancelSignal;
use crate::error::HttpError;
use crate::host::{HttpRequest, HttpResponse, HttpSend};

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// What the mock does for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and raw body text.
    Respond { status: u16, body: String },
    /// Respond after a delay on the tokio clock.
    Delayed {
        delay: Duration,
        status: u16,
        body: String,
    },
    /// Fail without a response.
    Network(String),
    /// Never respond.
    Hang,
    /// Fire the given signal, then never respond.
    CancelWith {
        signal: CancelSignal,
        reason: String,
    },
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self::Respond {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::text(status, "")
    }

    pub fn network(message: &str) -> Self {
        Self::Network(message.to_string())
    }

    pub fn delayed(delay: Duration, status: u16, body: Value) -> Self {
        Self::Delayed {
            delay,
            status,
            body: body.to_string(),
        }
    }

    pub fn cancel(signal: &CancelSignal, reason: &str) -> Self {
        Self::CancelWith {
            signal: signal.clone(),
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSender
// ---------------------------------------------------------------------------

/// Scripted [`HttpSend`]. Clones share scripts and the call log.
#[derive(Clone, Default)]
pub struct MockSender {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for `path`.
    pub fn reply(self, path: &str, reply: Reply) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths of every request received, in order.
    pub fn paths(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|request| path_of(&request.url).to_string())
            .collect()
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpSend for MockSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let path = path_of(&request.url).to_string();
        self.calls.lock().unwrap().push(request);

        match self.next_reply(&path) {
            None => Ok(HttpResponse::new(404, "")),
            Some(Reply::Respond { status, body }) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Delayed {
                delay,
                status,
                body,
            }) => {
                tokio::time::sleep(delay).await;
                Ok(HttpResponse::new(status, body))
            }
            Some(Reply::Network(message)) => Err(HttpError::Connect(message)),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::CancelWith { signal, reason }) => {
                signal.cancel_with_reason(reason);
                std::future::pending().await
            }
        }
    }
}

/// Path portion of an absolute URL (`https://host/v2/health` -> `/v2/health`).
fn path_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.find('/').map_or("/", |index| &rest[index..])
}

#[test]
fn test_path_of() {
    assert_eq!(path_of("https://example.dev/v2/health"), "/v2/health");
    assert_eq!(path_of("http://localhost:3002/"), "/");
    assert_eq!(path_of("http://localhost:3002"), "/");
}
