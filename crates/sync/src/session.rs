// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handle to one running (or finished) sync session.

use std::sync::OnceLock;

use tokio::sync::watch;

use crate::state::SyncState;

/// Shared view of a session: its current state, its outcome once finished,
/// and a way to cancel it.
#[derive(Debug)]
pub struct SyncSession {
    state: watch::Sender<SyncState>,
    cancel: watch::Sender<bool>,
    finished: watch::Sender<bool>,
    outcome: OnceLock<SyncState>,
}

impl SyncSession {
    pub(crate) fn new() -> Self {
        SyncSession {
            state: watch::channel(SyncState::Idle).0,
            cancel: watch::channel(false).0,
            finished: watch::channel(false).0,
            outcome: OnceLock::new(),
        }
    }

    /// Returns the state the session is in right now.
    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Asks the session to stop at the next opportunity.
    ///
    /// A session blocked on a conflict decision stops immediately. Whatever
    /// the session already wrote locally stays; the store transaction is
    /// cancelled.
    pub fn cancel(&self) {
        if !self.cancel.send_replace(true) {
            tracing::info!("sync cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Returns the terminal state the session ended in, once it has.
    pub fn outcome(&self) -> Option<SyncState> {
        self.outcome.get().copied()
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Waits for the session to end and returns its outcome.
    pub async fn wait(&self) -> SyncState {
        let mut finished = self.finished.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = finished.wait_for(|done| *done).await;
        self.outcome().unwrap_or(SyncState::Failed)
    }

    /// Resolves once cancellation is requested.
    pub(crate) async fn cancelled(&self) {
        let mut cancel = self.cancel.subscribe();
        let _ = cancel.wait_for(|cancelled| *cancelled).await;
    }

    pub(crate) fn set_state(&self, state: SyncState) {
        self.state.send_replace(state);
    }

    /// Records the outcome and returns the session to idle.
    pub(crate) fn finish(&self, outcome: SyncState) {
        let _ = self.outcome.set(outcome);
        self.set_state(SyncState::Idle);
        self.finished.send_replace(true);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
