//! Coordination of the token refresh protocol.
//!
//! At most one refresh call is ever in flight. The first request to observe
//! an expired token becomes the leader and performs the refresh; requests
//! that hit a 401 while it is pending register as followers and suspend until
//! the leader publishes the outcome. Followers are released in arrival order.

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Result of a refresh cycle, broadcast to every queued follower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token pair was obtained; retry with this access token.
    Refreshed(String),

    /// The refresh failed or no refresh token was stored; credentials have
    /// been cleared and waiters surface their original authorization error.
    Failed,
}

/// Role assigned to a request entering the refresh protocol.
pub enum RefreshRole {
    /// This request performs the refresh and must call
    /// [`RefreshCoordinator::complete`] on both outcomes.
    Leader,

    /// Another refresh is pending; await its outcome.
    Follower(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct Inner {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Shared refresh state: the in-flight flag plus the queue of suspended
/// requests waiting for the pending refresh.
#[derive(Default)]
pub struct RefreshCoordinator {
    inner: Mutex<Inner>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the protocol. The first caller while no refresh is pending
    /// becomes the leader; everyone else queues.
    pub fn begin(&self) -> RefreshRole {
        let mut inner = self.inner.lock();
        if inner.in_flight {
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(tx);
            RefreshRole::Follower(rx)
        } else {
            inner.in_flight = true;
            RefreshRole::Leader
        }
    }

    /// Publish the outcome, clear the in-flight flag, and release all queued
    /// followers in arrival order. Called by the leader on both success and
    /// failure so a later expiry can start a new cycle.
    pub fn complete(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut inner = self.inner.lock();
            inner.in_flight = false;
            std::mem::take(&mut inner.waiters)
        };

        for waiter in waiters {
            // A dropped receiver means the follower gave up; nothing to do.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Whether a refresh is currently pending.
    pub fn is_in_flight(&self) -> bool {
        self.inner.lock().in_flight
    }
}
