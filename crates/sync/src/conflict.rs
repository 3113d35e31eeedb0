// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Title conflicts between an incoming note and a different local note.
//!
//! The session worker cannot decide these on its own. It builds a
//! [`ConflictRequest`], hands it to whoever owns the notes, and blocks until
//! the request is answered (or dropped, which counts as
//! [`ConflictResolution::Cancel`]).

use quire_core::{NoteCollection, NoteRecord, NoteUpdate};
use tokio::sync::oneshot;
use uuid::Uuid;

/// How to get an existing local note out of an incoming note's way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Abort the session without touching anything.
    Cancel,
    /// Delete the local note.
    DeleteExisting,
    /// Rename the local note and rewrite links to it in other notes.
    RenameExistingAndUpdate(String),
    /// Rename the local note only.
    RenameExistingNoUpdate(String),
}

/// A pending title conflict awaiting a decision.
#[derive(Debug)]
pub struct ConflictRequest {
    local: NoteRecord,
    incoming: NoteUpdate,
    suggested_title: String,
    responder: oneshot::Sender<ConflictResolution>,
}

impl ConflictRequest {
    pub(crate) fn new(
        local: NoteRecord,
        incoming: NoteUpdate,
        suggested_title: String,
    ) -> (Self, oneshot::Receiver<ConflictResolution>) {
        let (responder, response) = oneshot::channel();
        let request = ConflictRequest { local, incoming, suggested_title, responder };
        (request, response)
    }

    /// The local note whose title is taken.
    pub fn local(&self) -> &NoteRecord {
        &self.local
    }

    /// The note arriving from the store.
    pub fn incoming(&self) -> &NoteUpdate {
        &self.incoming
    }

    /// A free title the local note could be renamed to.
    pub fn suggested_title(&self) -> &str {
        &self.suggested_title
    }

    /// Answers the request. Consumes it, so a conflict is answered once.
    pub fn respond(self, resolution: ConflictResolution) {
        if self.responder.send(resolution).is_err() {
            tracing::debug!("conflict answered after the session gave up on it");
        }
    }
}

/// Picks an unused title of the form `"<base> (<tag>)"`, then
/// `"<base> (<tag>) 1"`, `"<base> (<tag>) 2"`, and so on.
pub fn suggest_title<C: NoteCollection + ?Sized>(notes: &C, base: &str, tag: &str) -> String {
    let candidate = format!("{base} ({tag})");
    if notes.find_by_title(&candidate).is_none() {
        return candidate;
    }
    let mut n: u64 = 1;
    loop {
        let numbered = format!("{candidate} {n}");
        if notes.find_by_title(&numbered).is_none() {
            return numbered;
        }
        n += 1;
    }
}

/// Applies a non-cancel resolution to the local note `uuid`.
pub(crate) fn apply_resolution<C: NoteCollection + ?Sized>(
    notes: &mut C,
    uuid: &Uuid,
    resolution: &ConflictResolution,
) -> quire_core::Result<()> {
    match resolution {
        ConflictResolution::Cancel => Ok(()),
        ConflictResolution::DeleteExisting => notes.delete(uuid).map(|_| ()),
        ConflictResolution::RenameExistingAndUpdate(title) => notes.rename(uuid, title, true),
        ConflictResolution::RenameExistingNoUpdate(title) => notes.rename(uuid, title, false),
    }
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
