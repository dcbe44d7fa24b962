//! Caller-side cancellation.
//!
//! A [`CancelSignal`] wraps a [`CancellationToken`] and remembers the reason
//! given by whoever cancelled it, so the failure a call reports can carry
//! that reason back unchanged.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Cloneable cancellation signal with an optional reason.
///
/// All clones observe the same state. The first reason recorded wins.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl CancelSignal {
    /// Creates a signal that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal without a reason.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Fires the signal and records why.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        let _ = self.reason.set(reason.into());
        self.token.cancel();
    }

    /// Returns true once the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason recorded when the signal fired.
    pub fn reason(&self) -> Option<String> {
        self.reason.get().cloned()
    }

    /// Completes when the signal fires.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The failure a call reports when this signal stops it.
    pub fn to_error(&self) -> ClientError {
        ClientError::cancelled(self.reason())
    }

    /// Underlying token, for composing with other tokio-util users.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let signal = CancelSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_cancelled());

        signal.cancel_with_reason("navigated away");
        assert!(clone.is_cancelled());
        assert_eq!(clone.reason().as_deref(), Some("navigated away"));
    }

    #[test]
    fn test_first_reason_wins() {
        let signal = CancelSignal::new();
        signal.cancel_with_reason("first");
        signal.cancel_with_reason("second");
        assert_eq!(signal.reason().as_deref(), Some("first"));
    }

    #[test]
    fn test_cancel_without_reason() {
        let signal = CancelSignal::new();
        signal.cancel();
        let err = signal.to_error();
        assert!(err.is_cancelled());
        assert_eq!(err.cancel_reason(), None);
    }

    #[tokio::test]
    async fn test_cancelled_future_completes() {
        let signal = CancelSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        signal.cancel();
        handle.await.unwrap();
    }
}
