//! Continuations for requests blocked behind an in-flight refresh.
//!
//! Each blocked request holds the receiving half of a one-shot channel; the
//! sending halves stay in the queue until the refresh settles. Draining is
//! a broadcast: every open channel gets the same outcome, then the queue is
//! empty again.

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::RefreshError;

/// Outcome delivered to a blocked request once the refresh settles.
///
/// The token slot is `None` in cookie-based deployments, where the refreshed
/// credential travels at the transport level.
pub type RefreshSignal = Result<Option<String>, RefreshError>;

/// FIFO queue of one-shot continuations, settled exactly once per refresh.
#[derive(Debug, Default)]
pub struct FailedRequestQueue {
    waiters: Mutex<Vec<oneshot::Sender<RefreshSignal>>>,
}

impl FailedRequestQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a continuation. The caller awaits the returned receiver
    /// while the refresh runs.
    pub fn enqueue(&self) -> oneshot::Receiver<RefreshSignal> {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().push(tx);
        rx
    }

    /// Release every waiter with the refreshed (optional) token.
    pub fn drain_success(&self, token: Option<String>) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        if waiters.is_empty() {
            return;
        }
        debug!(count = waiters.len(), "releasing requests queued behind refresh");
        for waiter in waiters {
            // A waiter whose task went away has nothing to receive.
            let _ = waiter.send(Ok(token.clone()));
        }
    }

    /// Reject every waiter with the same refresh error.
    pub fn drain_failure(&self, error: &RefreshError) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        if waiters.is_empty() {
            return;
        }
        debug!(
            count = waiters.len(),
            error = %error,
            "rejecting requests queued behind failed refresh"
        );
        for waiter in waiters {
            let _ = waiter.send(Err(error.clone()));
        }
    }

    /// Number of continuations currently queued.
    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.waiters.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[tokio::test]
    async fn drain_success_releases_every_waiter() {
        let queue = FailedRequestQueue::new();
        let first = queue.enqueue();
        let second = queue.enqueue();
        let third = queue.enqueue();
        assert_eq!(queue.len(), 3);

        queue.drain_success(Some("fresh-token".to_string()));

        assert_eq!(first.await.unwrap(), Ok(Some("fresh-token".to_string())));
        assert_eq!(second.await.unwrap(), Ok(Some("fresh-token".to_string())));
        assert_eq!(third.await.unwrap(), Ok(Some("fresh-token".to_string())));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn drain_success_without_token_signals_cookie_refresh() {
        let queue = FailedRequestQueue::new();
        let waiter = queue.enqueue();

        queue.drain_success(None);

        assert_eq!(waiter.await.unwrap(), Ok(None));
    }

    #[tokio::test]
    async fn drain_failure_delivers_the_same_error_to_all() {
        let queue = FailedRequestQueue::new();
        let first = queue.enqueue();
        let second = queue.enqueue();

        let error = RefreshError::rejected(StatusCode::UNAUTHORIZED, "session revoked");
        queue.drain_failure(&error);

        assert_eq!(first.await.unwrap(), Err(error.clone()));
        assert_eq!(second.await.unwrap(), Err(error));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn draining_an_empty_queue_is_a_no_op() {
        let queue = FailedRequestQueue::new();
        queue.drain_success(None);
        queue.drain_failure(&RefreshError::Transport("offline".to_string()));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn dropped_receivers_do_not_block_the_drain() {
        let queue = FailedRequestQueue::new();
        let kept = queue.enqueue();
        drop(queue.enqueue());

        queue.drain_success(None);

        assert_eq!(kept.await.unwrap(), Ok(None));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn waiters_settle_exactly_once() {
        let queue = FailedRequestQueue::new();
        let waiter = queue.enqueue();

        queue.drain_success(None);
        // A second drain finds nothing; the waiter keeps its first outcome.
        queue.drain_failure(&RefreshError::Transport("late".to_string()));

        assert_eq!(waiter.await.unwrap(), Ok(None));
    }
}
