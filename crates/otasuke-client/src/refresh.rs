//! Single-flight credential refresh coordination.
//!
//! Every request that hits a 401 calls [`RefreshCoordinator::enter`]. The
//! first caller becomes the leader and performs the one refresh network call;
//! everyone arriving while that call is outstanding is queued and receives
//! the leader's outcome in arrival order.
//!
//! The state lives behind a synchronous mutex that is never held across an
//! `.await`, so "check `in_progress`, then enqueue or start a refresh" is one
//! indivisible step regardless of how many runtime threads are in play.
//!
//! Caller-supplied callbacks (credential persistence and session teardown)
//! always run with the mutex released, so they may call back into the
//! coordinator. `in_progress` stays set until they return.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::RefreshError;

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

#[derive(Default)]
struct RefreshState {
    /// True while a leader holds a lease for the current epoch.
    in_progress: bool,
    /// Requests parked behind the in-flight refresh, oldest first.
    waiters: VecDeque<Waiter>,
    /// Bumped by `reset`; leases from older epochs no longer own the state.
    epoch: u64,
}

impl RefreshState {
    /// Hand `outcome` to every waiter in FIFO order.
    fn notify(&mut self, outcome: &Result<String, RefreshError>) -> usize {
        let count = self.waiters.len();
        while let Some(waiter) = self.waiters.pop_front() {
            // A dropped receiver means that caller gave up; nothing to do.
            let _ = waiter.send(outcome.clone());
        }
        count
    }

    /// Notify every waiter, then release the flag.
    fn drain(&mut self, outcome: &Result<String, RefreshError>) -> usize {
        let count = self.notify(outcome);
        self.in_progress = false;
        count
    }
}

/// Coordinates credential refreshes for one client.
///
/// Each [`ApiClient`](crate::ApiClient) owns its own coordinator, so unrelated
/// clients (and tests) never share refresh state.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Result of [`RefreshCoordinator::enter`].
pub enum Entry<'a> {
    /// No refresh was running; the caller must perform it.
    Leader(RefreshLease<'a>),
    /// A refresh is running; wait for its outcome.
    Waiter(RefreshWaiter),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh, or start one if none is running.
    pub fn enter(&self) -> Entry<'_> {
        let mut state = self.state.lock();

        if state.in_progress {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            debug!(position = state.waiters.len(), "Queued behind in-flight refresh");
            return Entry::Waiter(RefreshWaiter { rx });
        }

        state.in_progress = true;
        Entry::Leader(RefreshLease {
            coordinator: self,
            epoch: state.epoch,
            finished: false,
        })
    }

    /// Abort any in-flight refresh on behalf of a logout.
    ///
    /// Queued requests are rejected with [`RefreshError::SessionClosed`], and
    /// whatever the in-flight refresh eventually returns is discarded.
    pub fn reset(&self) -> usize {
        let mut state = self.state.lock();
        state.epoch = state.epoch.wrapping_add(1);
        let rejected = state.drain(&Err(RefreshError::SessionClosed));
        if rejected > 0 {
            debug!(rejected, "Rejected queued requests on session reset");
        }
        rejected
    }

    /// Check if a refresh call is currently outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_progress
    }

    /// Number of requests parked behind the in-flight refresh.
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

/// A request parked behind an in-flight refresh.
pub struct RefreshWaiter {
    rx: oneshot::Receiver<Result<String, RefreshError>>,
}

impl RefreshWaiter {
    /// Wait for the refresh to finish; yields the new access token.
    pub async fn wait(self) -> Result<String, RefreshError> {
        match self.rx.await {
            Ok(outcome) => outcome,
            // The coordinator was dropped with us still queued.
            Err(_) => Err(RefreshError::Interrupted),
        }
    }
}

/// Ownership of the in-flight refresh.
///
/// Must be finished with [`resolve`](Self::resolve) or
/// [`reject`](Self::reject). Dropping it unfinished (for example because the
/// leader's future was cancelled) rejects the queue with
/// [`RefreshError::Interrupted`] so no waiter is left hanging.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    epoch: u64,
    finished: bool,
}

impl RefreshLease<'_> {
    /// Complete the refresh successfully.
    ///
    /// `persist` runs with the coordinator unlocked but before any waiter is
    /// woken, so every retried request sees the rotated credentials. Requests
    /// that fail meanwhile keep queueing behind this lease. If `persist`
    /// fails the waiters are rejected with its error and `teardown` runs,
    /// exactly as for [`reject`](Self::reject).
    ///
    /// Returns the number of waiters resumed, or
    /// [`RefreshError::SessionClosed`] when a reset happened mid-flight. A
    /// reset seen before `persist` skips it; one seen after it leaves the
    /// stored credentials to the caller.
    pub fn resolve<P, T>(
        mut self,
        access_token: &str,
        persist: P,
        teardown: T,
    ) -> Result<usize, RefreshError>
    where
        P: FnOnce() -> Result<(), RefreshError>,
        T: FnOnce(),
    {
        if !self.is_current() {
            self.finished = true;
            debug!("Discarding refresh result from a closed session");
            return Err(RefreshError::SessionClosed);
        }

        if let Err(error) = persist() {
            self.fail(&error, teardown);
            return Err(error);
        }

        self.finished = true;
        let mut state = self.coordinator.state.lock();
        if state.epoch != self.epoch {
            debug!("Session closed while storing refreshed credentials");
            return Err(RefreshError::SessionClosed);
        }
        Ok(state.drain(&Ok(access_token.to_string())))
    }

    /// Complete the refresh with a failure.
    ///
    /// Waiters are rejected first. `teardown` then runs with the coordinator
    /// unlocked, and `in_progress` is only released once it returns, so a
    /// request arriving in between queues instead of starting a second
    /// refresh with stale credentials.
    ///
    /// Returns `false` (and skips `teardown`) when a reset happened
    /// mid-flight.
    pub fn reject<F>(mut self, error: &RefreshError, teardown: F) -> bool
    where
        F: FnOnce(),
    {
        self.fail(error, teardown)
    }

    fn is_current(&self) -> bool {
        self.coordinator.state.lock().epoch == self.epoch
    }

    fn fail<F>(&mut self, error: &RefreshError, teardown: F) -> bool
    where
        F: FnOnce(),
    {
        let rejected = {
            let mut state = self.coordinator.state.lock();
            if state.epoch != self.epoch {
                self.finished = true;
                return false;
            }
            state.notify(&Err(error.clone()))
        };

        if rejected > 0 {
            debug!(rejected, "Rejected queued requests after refresh failure");
        }

        teardown();
        self.release(error);
        true
    }

    /// Clear `in_progress` unless a reset already moved to a newer epoch.
    fn release(&mut self, error: &RefreshError) {
        self.finished = true;
        let mut state = self.coordinator.state.lock();
        if state.epoch == self.epoch {
            // Requests that queued while teardown ran get the same answer.
            state.drain(&Err(error.clone()));
        }
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let mut state = self.coordinator.state.lock();
        if state.epoch == self.epoch {
            warn!("Refresh abandoned before completion; releasing queued requests");
            state.drain(&Err(RefreshError::Interrupted));
        }
    }
}
