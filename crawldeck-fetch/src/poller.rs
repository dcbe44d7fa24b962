//! Interval polling of a client operation.
//!
//! A [`Poller`] calls a fetch function on a fixed interval, handing each tick
//! a fresh [`CancelSignal`]. Results are published through a `watch` channel
//! as [`PollState`] snapshots.
//!
//! Outcome handling per tick:
//!
//! - success stores the value and clears the error
//! - `Cancelled` is ignored
//! - HTTP 404 stores the error and stops polling, since the server does not
//!   offer the operation
//! - any other failure is stored and polling continues

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::cancel::CancelSignal;
use crate::error::ClientError;

/// Reason attached to the in-flight tick when polling stops.
pub const STOP_REASON: &str = "Polling stopped";

// ============================================================================
// Poll State
// ============================================================================

/// Snapshot of a poller.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Last successful value.
    pub data: Option<T>,
    /// Last failure, cleared by the next success.
    pub error: Option<ClientError>,
    /// A tick is in flight.
    pub is_loading: bool,
    /// The poller is still scheduling ticks.
    pub is_active: bool,
    /// When `data` was last replaced.
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_active: true,
            last_updated: None,
        }
    }
}

impl<T> PollState<T> {
    /// Returns true if polling stopped because the server lacks the operation.
    pub fn is_unsupported(&self) -> bool {
        !self.is_active && self.error.as_ref().is_some_and(ClientError::is_not_found)
    }
}

// ============================================================================
// Poller
// ============================================================================

/// Background task polling one operation.
///
/// Dropping the poller stops it.
pub struct Poller<T> {
    state: watch::Receiver<PollState<T>>,
    stop: CancelSignal,
    handle: Option<JoinHandle<()>>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts polling. The first tick runs immediately.
    pub fn spawn<F, Fut>(period: Duration, fetch: F) -> Self
    where
        F: Fn(CancelSignal) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(PollState::default());
        let stop = CancelSignal::new();
        let handle = tokio::spawn(run(period, fetch, tx, stop.clone()));

        Self {
            state: rx,
            stop,
            handle: Some(handle),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> PollState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state.clone()
    }

    /// Returns true while ticks are being scheduled.
    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active
    }

    /// Stops polling and cancels the in-flight tick, if any.
    pub fn stop(&self) {
        self.stop.cancel_with_reason(STOP_REASON);
    }

    /// Waits for the polling task to finish.
    ///
    /// Completes once [`Poller::stop`] was called or the operation turned
    /// out to be unsupported.
    pub async fn finished(mut self) -> PollState<T> {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Polling task failed");
            }
        }
        self.state()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.stop.cancel_with_reason(STOP_REASON);
    }
}

async fn run<T, F, Fut>(
    period: Duration,
    fetch: F,
    tx: watch::Sender<PollState<T>>,
    stop: CancelSignal,
) where
    F: Fn(CancelSignal) -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(?period, "Polling started");

    loop {
        tokio::select! {
            biased;
            () = stop.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let signal = CancelSignal::new();
        tx.send_modify(|s| s.is_loading = true);

        let result = tokio::select! {
            biased;
            () = stop.cancelled() => {
                signal.cancel_with_reason(STOP_REASON);
                break;
            }
            result = fetch(signal.clone()) => result,
        };

        match result {
            Ok(data) => tx.send_modify(|s| {
                s.data = Some(data);
                s.error = None;
                s.is_loading = false;
                s.last_updated = Some(Utc::now());
            }),
            Err(error) if error.is_cancelled() => {
                debug!("Tick cancelled, ignoring");
                tx.send_modify(|s| s.is_loading = false);
            }
            Err(error) if error.is_not_found() => {
                info!(error = %error, "Operation unsupported by server, stopping");
                tx.send_modify(|s| {
                    s.error = Some(error);
                    s.is_loading = false;
                });
                break;
            }
            Err(error) => {
                debug!(error = %error, "Tick failed");
                tx.send_modify(|s| {
                    s.error = Some(error);
                    s.is_loading = false;
                });
            }
        }
    }

    tx.send_modify(|s| {
        s.is_loading = false;
        s.is_active = false;
    });
    debug!("Polling stopped");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_not_found() {
        let calls = counter();
        let seen = calls.clone();
        let poller: Poller<u32> = Poller::spawn(Duration::from_secs(5), move |_signal| {
            let n = seen.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(1)
                } else {
                    Err(ClientError::not_found("Not found"))
                }
            }
        });

        let state = poller.finished().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.data, Some(1));
        assert!(state.is_unsupported());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_keep_polling() {
        let calls = counter();
        let seen = calls.clone();
        let poller: Poller<u32> = Poller::spawn(Duration::from_secs(1), move |_signal| {
            let n = seen.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Err(ClientError::http(500, "boom", None)),
                    1 => Err(ClientError::cancelled(None)),
                    _ => Ok(42),
                }
            }
        });

        let mut rx = poller.subscribe();
        rx.wait_for(|s| s.data.is_some()).await.unwrap();

        let state = poller.state();
        assert_eq!(state.data, Some(42));
        assert!(state.error.is_none());
        assert!(state.last_updated.is_some());
        assert!(state.is_active);
        assert!(calls.load(Ordering::SeqCst) >= 3);

        poller.stop();
        let state = poller.finished().await;
        assert!(!state.is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_kept_until_success() {
        let calls = counter();
        let seen = calls.clone();
        let poller: Poller<u32> = Poller::spawn(Duration::from_secs(1), move |_signal| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::Timeout) }
        });

        let mut rx = poller.subscribe();
        rx.wait_for(|s| s.error.is_some()).await.unwrap();
        assert_eq!(poller.state().error.unwrap().status_code(), Some(408));
        assert!(poller.is_active());
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_in_flight_tick() {
        let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<CancelSignal>();
        let signal_tx = std::sync::Mutex::new(Some(signal_tx));

        let poller: Poller<u32> = Poller::spawn(Duration::from_secs(60), move |signal| {
            if let Some(tx) = signal_tx.lock().unwrap().take() {
                let _ = tx.send(signal);
            }
            std::future::pending()
        });

        let tick_signal = signal_rx.await.unwrap();
        assert!(!tick_signal.is_cancelled());

        poller.stop();
        let state = poller.finished().await;
        assert!(tick_signal.is_cancelled());
        assert_eq!(tick_signal.reason().as_deref(), Some(STOP_REASON));
        assert!(!state.is_active);
        assert!(state.data.is_none());
    }
}
