use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::error::ApiError;

type Waiter = oneshot::Sender<Result<String, ApiError>>;

/// Outcome of joining the coordinator while a 401 is being handled.
///
/// The first caller to arrive while the coordinator is idle becomes the
/// leader and must run the refresh call, then settle. Everyone arriving
/// while a refresh is in flight becomes a follower and awaits the leader's
/// outcome on its receiver.
pub enum RefreshTicket {
    Leader,
    Follower(oneshot::Receiver<Result<String, ApiError>>),
}

/// Single-flight controller for token refresh.
///
/// Many requests can fail with 401 in the same window before any refresh
/// response arrives; this guarantees at most one refresh call is in flight
/// system-wide. One coordinator is owned per client so that tests can run
/// independent instances.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<Waiter>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        RefreshCoordinator::default()
    }

    /// Claims the refresh. The check-and-set happens under one lock with no
    /// await point, so exactly one caller per cycle sees `Leader`.
    pub fn join(&self) -> RefreshTicket {
        let mut state = self.state.lock().unwrap();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshTicket::Follower(rx)
        } else {
            state.refreshing = true;
            RefreshTicket::Leader
        }
    }

    /// Settles the in-flight refresh: returns the coordinator to idle and
    /// wakes every queued follower with the leader's outcome.
    pub fn settle(&self, outcome: &Result<String, ApiError>) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}
