//! Timer abstraction used for request deadlines.

use async_trait::async_trait;
use std::time::Duration;

/// Sleeps for a duration.
///
/// Injected into the transport so deadlines can be driven deterministically.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Completes after `duration` has elapsed.
    async fn sleep(&self, duration: Duration);
}

/// [`Timer`] backed by `tokio::time`.
///
/// Honors a paused tokio clock, so `#[tokio::test(start_paused = true)]`
/// tests advance it without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_follows_paused_clock() {
        let start = tokio::time::Instant::now();
        TokioTimer.sleep(Duration::from_secs(30)).await;
        assert!(start.elapsed() >= Duration::from_secs(30));
    }
}
