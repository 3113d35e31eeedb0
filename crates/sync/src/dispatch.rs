// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Marshaling note access to the collection's owner.
//!
//! The notes live with a single owner (the CLI's main task, or a test).
//! The session worker never touches them directly: it sends a closure
//! through a [`NoteDispatcher`] and blocks until the owner has run it.

use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::observer::{deliver, SyncEvent, SyncObserver};

type Job<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Sends work to the task that owns a note collection.
pub struct NoteDispatcher<C> {
    jobs: mpsc::UnboundedSender<Job<C>>,
}

impl<C> Clone for NoteDispatcher<C> {
    fn clone(&self) -> Self {
        NoteDispatcher { jobs: self.jobs.clone() }
    }
}

impl<C: 'static> NoteDispatcher<C> {
    /// Runs `f` on the owner and waits for its result.
    ///
    /// Blocks the calling thread, so it must only be used from a blocking
    /// worker, never from async code.
    pub fn call<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.jobs
            .send(Box::new(move |notes: &mut C| {
                let _ = tx.send(f(notes));
            }))
            .map_err(|_| Error::CollectionClosed)?;
        rx.blocking_recv().map_err(|_| Error::CollectionClosed)
    }
}

/// Owns a note collection and serves dispatched work against it.
pub struct NoteOwner<C> {
    notes: C,
    sender: mpsc::UnboundedSender<Job<C>>,
    jobs: mpsc::UnboundedReceiver<Job<C>>,
}

impl<C> NoteOwner<C> {
    pub fn new(notes: C) -> Self {
        let (sender, jobs) = mpsc::unbounded_channel();
        NoteOwner { notes, sender, jobs }
    }

    /// Returns a handle for running work against these notes.
    pub fn dispatcher(&self) -> NoteDispatcher<C> {
        NoteDispatcher { jobs: self.sender.clone() }
    }

    pub fn notes(&self) -> &C {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut C {
        &mut self.notes
    }

    pub fn into_inner(self) -> C {
        self.notes
    }

    /// Serves dispatched jobs and delivers session events until the session
    /// closes its event stream.
    ///
    /// Events are handled ahead of jobs, so an observer sees a state change
    /// before the work that follows it.
    pub async fn drive<O: SyncObserver<C> + ?Sized>(
        &mut self,
        mut events: mpsc::UnboundedReceiver<SyncEvent>,
        observer: &mut O,
    ) {
        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => deliver(observer, &self.notes, event),
                    None => break,
                },
                Some(job) = self.jobs.recv() => job(&mut self.notes),
            }
        }
        self.run_pending();
    }

    /// Runs any jobs already queued without waiting for more.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.jobs.try_recv() {
            job(&mut self.notes);
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
