//! Capability probing.
//!
//! A [`ProbeChain`] presents one logical operation backed by an ordered list
//! of [`ProbeStep`]s: the current endpoint first, then legacy surfaces. Steps
//! run strictly one after another. The first success ends the chain; a
//! failure either moves on to the next step or ends the chain, as decided by
//! the failing step's [`ProbeStep::should_continue`].
//!
//! Cancellation always ends the chain. When every step has failed, the chain
//! reports the last failure unchanged.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::RequestOptions;
use crate::error::ClientError;
use crate::transport::Transport;

// ============================================================================
// Probe Step
// ============================================================================

/// One way of performing a probed operation.
#[async_trait]
pub trait ProbeStep<T>: Send + Sync {
    /// Path this step queries first, used for logging and attempt records.
    fn endpoint(&self) -> &'static str;

    /// Performs the step.
    async fn probe(&self, transport: &Transport, options: &RequestOptions)
    -> Result<T, ClientError>;

    /// Whether the chain should try the next step after this failure.
    ///
    /// Cancellation is checked by the chain before this is consulted.
    fn should_continue(&self, error: &ClientError) -> bool {
        error.is_not_found()
    }
}

/// Reads a 2xx body into the operation's result.
pub type ReadBody<T> = fn(Value) -> Result<T, ClientError>;

/// Step that GETs a current endpoint and reads the body with `read`.
///
/// Falls through only on 404.
pub struct CurrentEndpoint<T> {
    path: &'static str,
    read: ReadBody<T>,
}

impl<T> CurrentEndpoint<T> {
    /// Creates a step for `path`.
    pub fn new(path: &'static str, read: ReadBody<T>) -> Self {
        Self { path, read }
    }
}

#[async_trait]
impl<T> ProbeStep<T> for CurrentEndpoint<T>
where
    T: Send + 'static,
{
    fn endpoint(&self) -> &'static str {
        self.path
    }

    async fn probe(
        &self,
        transport: &Transport,
        options: &RequestOptions,
    ) -> Result<T, ClientError> {
        let value = transport.get(self.path, options).await?;
        (self.read)(value)
    }
}

// ============================================================================
// Probe Attempt
// ============================================================================

/// Record of a single step.
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    /// Endpoint the step queried.
    pub endpoint: &'static str,
    /// Failure, if the step failed.
    pub error: Option<ClientError>,
    /// How long the step took.
    pub duration: Duration,
}

impl ProbeAttempt {
    fn success(endpoint: &'static str, duration: Duration) -> Self {
        Self {
            endpoint,
            error: None,
            duration,
        }
    }

    fn failure(endpoint: &'static str, error: ClientError, duration: Duration) -> Self {
        Self {
            endpoint,
            error: Some(error),
            duration,
        }
    }

    /// Returns true if the step succeeded.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

// ============================================================================
// Probe Outcome
// ============================================================================

/// The outcome of running a chain.
#[derive(Debug)]
pub struct ProbeOutcome<T> {
    /// The result, or the last failure.
    pub result: Result<T, ClientError>,
    /// Every step that ran, in order.
    pub attempts: Vec<ProbeAttempt>,
}

impl<T> ProbeOutcome<T> {
    /// Returns true if some step succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Endpoint of the step that succeeded.
    pub fn answered_by(&self) -> Option<&'static str> {
        self.attempts
            .last()
            .filter(|a| a.succeeded())
            .map(|a| a.endpoint)
    }

    /// Returns true if a step other than the first produced the result.
    pub fn used_fallback(&self) -> bool {
        self.is_success() && self.attempts.len() > 1
    }

    /// Consumes the outcome, keeping only the result.
    pub fn into_result(self) -> Result<T, ClientError> {
        self.result
    }
}

// ============================================================================
// Probe Chain
// ============================================================================

/// Ordered steps for one probed operation.
pub struct ProbeChain<T> {
    name: &'static str,
    steps: Vec<Box<dyn ProbeStep<T>>>,
}

impl<T: Send> ProbeChain<T> {
    /// Creates a chain from steps in the order they should run.
    pub fn new(name: &'static str, steps: Vec<Box<dyn ProbeStep<T>>>) -> Self {
        Self { name, steps }
    }

    /// Operation name, for logging.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Endpoints in the order they are tried.
    pub fn endpoints(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.endpoint()).collect()
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the steps in order until one succeeds or the chain ends.
    #[instrument(skip(self, transport, options), fields(operation = self.name))]
    pub async fn execute(&self, transport: &Transport, options: &RequestOptions) -> ProbeOutcome<T> {
        let mut attempts = Vec::with_capacity(self.steps.len());
        let mut last_error =
            ClientError::not_found(format!("No endpoints configured for {}", self.name));

        for (index, step) in self.steps.iter().enumerate() {
            let endpoint = step.endpoint();
            if let Some(signal) = options.signal.as_ref().filter(|s| s.is_cancelled()) {
                debug!(endpoint, "Cancelled before step");
                return ProbeOutcome {
                    result: Err(signal.to_error()),
                    attempts,
                };
            }

            let start = Instant::now();
            match step.probe(transport, options).await {
                Ok(value) => {
                    if index > 0 {
                        info!(endpoint, "Fallback endpoint answered");
                    }
                    attempts.push(ProbeAttempt::success(endpoint, start.elapsed()));
                    return ProbeOutcome {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(error) => {
                    attempts.push(ProbeAttempt::failure(endpoint, error.clone(), start.elapsed()));

                    if error.is_cancelled() || !step.should_continue(&error) {
                        debug!(endpoint, error = %error, "Step failure ends the chain");
                        return ProbeOutcome {
                            result: Err(error),
                            attempts,
                        };
                    }
                    debug!(endpoint, error = %error, "Endpoint unavailable, trying next");
                    last_error = error;
                }
            }
        }

        debug!("All endpoints exhausted");
        ProbeOutcome {
            result: Err(last_error),
            attempts,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
