// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deciding what a session does to each note.

use chrono::{DateTime, Utc};
use quire_core::{NoteCollection, NoteRecord, NoteUpdate, Revision, NO_REVISION};
use uuid::Uuid;

use crate::conflict::suggest_title;

/// Title tag for incoming copies kept after a concurrent edit.
const CONFLICT_TAG: &str = "conflict";

/// Result of applying one incoming update to the local notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Applied {
    Created(String),
    Modified(String),
    Deleted(String),
    /// Tombstone for a note this replica never had.
    Skipped,
    /// The local note changed too. It is kept; the incoming copy, if any,
    /// was saved under the returned title.
    ConcurrentEdit { local: String, copy: Option<String> },
}

/// Applies an incoming update.
///
/// A local note changed after `last_sync`, or still waiting for an upload
/// that failed (`pending_upload`), is never overwritten or deleted unless its
/// content already matches the incoming note.
pub(crate) fn apply_update<C: NoteCollection + ?Sized>(
    notes: &mut C,
    update: &NoteUpdate,
    last_sync: DateTime<Utc>,
    pending_upload: bool,
) -> quire_core::Result<Applied> {
    let Some(local) = notes.find_by_uuid(&update.uuid).cloned() else {
        return match &update.content {
            Some(content) => Ok(Applied::Created(notes.create_from_content(update.uuid, content)?.title)),
            None => Ok(Applied::Skipped),
        };
    };
    let locally_modified = pending_upload || local.change_date > last_sync;

    let Some(content) = &update.content else {
        if locally_modified {
            return Ok(Applied::ConcurrentEdit { local: local.title, copy: None });
        }
        notes.delete(&update.uuid)?;
        return Ok(Applied::Deleted(local.title));
    };

    let incoming = NoteRecord::from_content(update.uuid, content)?;
    if locally_modified && !incoming.same_content(&local) {
        let title = suggest_title(notes, &incoming.title, CONFLICT_TAG);
        notes.create(&title, &incoming.text)?;
        return Ok(Applied::ConcurrentEdit { local: local.title, copy: Some(title) });
    }

    Ok(Applied::Modified(notes.update_from_content(&update.uuid, content)?.title))
}

/// Local notes that need uploading.
#[derive(Debug, Default)]
pub(crate) struct LocalChanges {
    /// Never synchronized.
    pub new: Vec<NoteRecord>,
    /// Synchronized before and changed since.
    pub modified: Vec<NoteRecord>,
}

impl LocalChanges {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty()
    }

    pub fn uuids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.new.iter().chain(self.modified.iter()).map(|n| n.uuid)
    }
}

/// Splits `notes` into new and modified notes.
///
/// `revision_of` returns the revision this replica last synchronized a note
/// at, or [`NO_REVISION`]. Notes for which `pending_upload` holds failed to
/// upload in an earlier session and count as modified whatever their date.
pub(crate) fn local_changes(
    notes: Vec<NoteRecord>,
    revision_of: impl Fn(&Uuid) -> Revision,
    pending_upload: impl Fn(&Uuid) -> bool,
    last_revision: Revision,
    last_sync: DateTime<Utc>,
) -> LocalChanges {
    let mut changes = LocalChanges::default();
    for note in notes {
        let revision = revision_of(&note.uuid);
        if revision == NO_REVISION {
            changes.new.push(note);
        } else if pending_upload(&note.uuid) || (revision <= last_revision && note.change_date > last_sync) {
            changes.modified.push(note);
        }
    }
    changes
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
