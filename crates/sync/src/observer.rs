// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session events and the observer that consumes them.

use crate::conflict::ConflictRequest;
use crate::state::{NoteSyncType, SyncState};

/// Something a running session wants its owner to know about.
#[derive(Debug)]
pub enum SyncEvent {
    StateChanged(SyncState),
    NoteSynchronized { title: String, kind: NoteSyncType },
    /// The session is blocked until the request is answered.
    ConflictDetected(ConflictRequest),
}

/// Receives session events on the thread that owns the notes.
///
/// `conflict_detected` must eventually answer the request, or drop it to
/// cancel the session.
pub trait SyncObserver<C> {
    fn state_changed(&mut self, _state: SyncState) {}

    fn note_synchronized(&mut self, _title: &str, _kind: NoteSyncType) {}

    fn conflict_detected(&mut self, notes: &C, request: ConflictRequest);
}

/// Routes one event to the matching observer callback.
pub(crate) fn deliver<C, O: SyncObserver<C> + ?Sized>(observer: &mut O, notes: &C, event: SyncEvent) {
    match event {
        SyncEvent::StateChanged(state) => observer.state_changed(state),
        SyncEvent::NoteSynchronized { title, kind } => observer.note_synchronized(&title, kind),
        SyncEvent::ConflictDetected(request) => observer.conflict_detected(notes, request),
    }
}
