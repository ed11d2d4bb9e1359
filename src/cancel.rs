//! Cooperative cancellation
//!
//! Syncs observe cancellation at their suspension points (throttle and
//! backoff sleeps) and at the top of each page loop, aborting without
//! emitting a bookmark for an incomplete page.

use tokio::sync::watch;

/// Create a linked cancel handle / token pair
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Owner side: request cancellation of all linked tokens
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observer side: cloneable, checked inside sync loops
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn none() -> Self {
        let (tx, rx) = watch::channel(false);
        // Leak the sender so the channel stays open for the token's lifetime.
        std::mem::forget(tx);
        Self { rx }
    }

    /// Check without waiting
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is signalled. Pends forever if the handle
    /// was dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_is_observed() {
        let (handle, token) = cancel_pair();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        // Completes immediately once cancelled.
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_none_token_never_cancels() {
        let token = CancelToken::none();
        assert!(!token.is_cancelled());

        let wait = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(wait.is_err());
    }
}
