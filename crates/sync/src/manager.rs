// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for starting sync sessions.

use std::sync::{Arc, Mutex, MutexGuard};

use quire_core::{Clock, NoteCollection, SyncClient, SystemClock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::dispatch::NoteDispatcher;
use crate::error::{Error, Result};
use crate::observer::SyncEvent;
use crate::provider::SyncServiceProvider;
use crate::runner::SessionRunner;
use crate::session::SyncSession;
use crate::state::SyncState;

/// Result of asking the manager for a sync.
#[derive(Debug)]
pub enum SyncStart {
    /// A new session is running; its events must be driven by the note
    /// owner (see [`NoteOwner::drive`](crate::NoteOwner::drive)).
    Started { session: Arc<SyncSession>, events: mpsc::UnboundedReceiver<SyncEvent> },
    /// A session was already running; no new one was started.
    AlreadyRunning(Arc<SyncSession>),
}

/// Runs sync sessions for one replica, one at a time.
pub struct SyncManager {
    provider: Option<Arc<dyn SyncServiceProvider>>,
    client: Arc<Mutex<SyncClient>>,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<Arc<SyncSession>>>,
}

impl SyncManager {
    pub fn new(client: SyncClient) -> Self {
        SyncManager {
            provider: None,
            client: Arc::new(Mutex::new(client)),
            clock: Arc::new(SystemClock),
            current: Mutex::new(None),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SyncServiceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider(&self) -> Option<&Arc<dyn SyncServiceProvider>> {
        self.provider.as_ref()
    }

    /// Locks the client manifest. Do not hold the guard across a session.
    pub fn client(&self) -> MutexGuard<'_, SyncClient> {
        self.client.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the most recently started session.
    pub fn current_session(&self) -> Option<Arc<SyncSession>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns the state of the running session, or `Idle`.
    pub fn state(&self) -> SyncState {
        self.current_session().map_or(SyncState::Idle, |s| s.state())
    }

    /// Starts a session against the notes behind `notes`.
    ///
    /// Must be called from inside a tokio runtime. The session runs on a
    /// blocking worker; the caller drives its events on the task that owns
    /// the notes.
    pub fn start<C: NoteCollection + 'static>(&self, notes: NoteDispatcher<C>) -> Result<SyncStart> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = current.as_ref().filter(|s| !s.is_finished()) {
            tracing::debug!("sync already running");
            return Ok(SyncStart::AlreadyRunning(Arc::clone(running)));
        }

        let session = Arc::new(SyncSession::new());
        let (events_tx, events) = mpsc::unbounded_channel();
        let runner = SessionRunner {
            session: Arc::clone(&session),
            provider: self.provider.clone(),
            client: Arc::clone(&self.client),
            clock: Arc::clone(&self.clock),
            notes,
            events: events_tx,
            runtime: runtime.clone(),
        };
        runtime.spawn_blocking(move || runner.run());

        *current = Some(Arc::clone(&session));
        Ok(SyncStart::Started { session, events })
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
