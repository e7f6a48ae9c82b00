//! Process-wide single-flight slot for the credential refresh.
//!
//! The coordinator decouples "who starts a refresh" from "who waits for
//! one": route guards, feature code, and the retry interceptor all observe
//! the same slot, so at most one refresh network call is ever in flight.
//! The slot holds a [`RefreshFuture`], a shared handle whose clones all
//! resolve to the same outcome.

use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::error::RefreshError;

/// Handle to the one in-flight refresh. Cloning is cheap and every clone
/// settles with the same outcome.
pub type RefreshFuture = Shared<BoxFuture<'static, Result<(), RefreshError>>>;

/// Outcome of an atomic join-or-start decision.
pub enum Flight<J> {
    /// A refresh was already in flight; carries whatever `on_join` produced
    /// (typically a queued continuation).
    Joined(J),
    /// This caller installed a new refresh and drives the cycle.
    Started(RefreshFuture),
}

/// Holds at most one in-flight refresh operation.
///
/// Lifecycle per cycle: [`publish`](Self::publish) when the refresh starts,
/// [`settle`](Self::settle) (or [`clear`](Self::clear)) exactly once when it
/// finishes, success or failure.
#[derive(Default)]
pub struct RefreshCoordinator {
    slot: Mutex<Option<RefreshFuture>>,
}

impl RefreshCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `refresh` as the current in-flight operation, replacing any
    /// previous value. Single-publisher discipline comes from
    /// [`join_or_start`](Self::join_or_start).
    pub fn publish(&self, refresh: RefreshFuture) {
        *self.slot.lock() = Some(refresh);
    }

    /// Snapshot of the in-flight refresh, if any.
    pub fn current(&self) -> Option<RefreshFuture> {
        self.slot.lock().clone()
    }

    /// Reset the slot to empty.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// True while a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Decide atomically between joining the in-flight refresh and starting
    /// a new one.
    ///
    /// With the slot occupied, `on_join` runs with a reference to the
    /// current refresh and its result is returned as [`Flight::Joined`].
    /// Otherwise `start` produces the new refresh, which is installed and
    /// handed back as [`Flight::Started`]. Both closures run under the slot
    /// lock: they must not block and must not call back into the
    /// coordinator.
    pub fn join_or_start<J>(
        &self,
        on_join: impl FnOnce(&RefreshFuture) -> J,
        start: impl FnOnce() -> RefreshFuture,
    ) -> Flight<J> {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(current) => Flight::Joined(on_join(current)),
            None => {
                let refresh = start();
                *slot = Some(refresh.clone());
                Flight::Started(refresh)
            }
        }
    }

    /// Clear the slot and run `f` under the same lock.
    ///
    /// Used by the refresh cycle to drain queued continuations: waiters only
    /// enqueue while the slot is occupied, so clearing and draining in one
    /// span leaves no window for a continuation to slip in and hang. `f`
    /// must not block and must not call back into the coordinator.
    pub fn settle<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut slot = self.slot.lock();
        *slot = None;
        f()
    }

    /// Run `f` only when no refresh is in flight, holding the slot lock so
    /// no cycle can start underneath it. Returns `None` when a refresh was
    /// active. `f` must not block and must not call back into the
    /// coordinator.
    pub fn run_if_idle<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let slot = self.slot.lock();
        if slot.is_none() {
            Some(f())
        } else {
            None
        }
    }

    /// Wait for any in-flight refresh to settle.
    ///
    /// Resolves immediately when the slot is empty. Never returns an error;
    /// a failed refresh still counts as completed. Intended for callers that
    /// only need quiescence, like an authentication check on navigation.
    pub async fn wait_for_completion(&self) {
        if let Some(refresh) = self.current() {
            let _ = refresh.await;
        }
    }
}
