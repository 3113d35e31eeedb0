// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-replica sync bookkeeping.
//!
//! [`SyncClient`] persists `manifest.json` in the note directory:
//!
//! ```json
//! {
//!   "last_sync_date": "2026-01-01T00:00:00Z",
//!   "last_sync_revision": 4,
//!   "notes": { "3f1c2a9e-...": 4 },
//!   "deleted_notes": { "9b0e6d1f-...": "Old Title" },
//!   "pending_uploads": ["c47a1d02-..."]
//! }
//! ```
//!
//! Every setter writes through immediately so an interrupted sync leaves
//! the bookkeeping consistent with what was already applied.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::atomic;
use crate::error::Result;
use crate::revision::{Revision, NO_REVISION};

/// File name of the client manifest inside the note directory.
pub const CLIENT_MANIFEST: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ClientState {
    #[serde(default = "epoch")]
    last_sync_date: DateTime<Utc>,
    #[serde(default = "no_revision")]
    last_sync_revision: Revision,
    #[serde(default)]
    notes: BTreeMap<Uuid, Revision>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    deleted_notes: BTreeMap<Uuid, String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pending_uploads: BTreeSet<Uuid>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn no_revision() -> Revision {
    NO_REVISION
}

impl Default for ClientState {
    fn default() -> Self {
        ClientState {
            last_sync_date: epoch(),
            last_sync_revision: NO_REVISION,
            notes: BTreeMap::new(),
            deleted_notes: BTreeMap::new(),
            pending_uploads: BTreeSet::new(),
        }
    }
}

/// Modification stamp used to notice external rewrites of the manifest.
type FileStamp = Option<(SystemTime, u64)>;

/// The client-side record of what has been synchronized.
#[derive(Debug)]
pub struct SyncClient {
    path: PathBuf,
    state: ClientState,
    stamp: FileStamp,
}

impl SyncClient {
    /// Opens the manifest at `path`; a missing file means a never-synced client.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = read_state(&path)?;
        let stamp = stamp_of(&path);
        Ok(SyncClient { path, state, stamp })
    }

    /// Opens `manifest.json` inside a note directory.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::open(dir.join(CLIENT_MANIFEST))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the manifest if it changed on disk since we last touched it.
    ///
    /// Returns true if a reload happened.
    pub fn reload_if_changed(&mut self) -> Result<bool> {
        let stamp = stamp_of(&self.path);
        if stamp == self.stamp {
            return Ok(false);
        }
        tracing::debug!(path = %self.path.display(), "client manifest changed on disk, reloading");
        self.state = read_state(&self.path)?;
        self.stamp = stamp;
        Ok(true)
    }

    pub fn last_sync_date(&self) -> DateTime<Utc> {
        self.state.last_sync_date
    }

    pub fn set_last_sync_date(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.state.last_sync_date = date;
        self.save()
    }

    pub fn last_synchronized_revision(&self) -> Revision {
        self.state.last_sync_revision
    }

    pub fn set_last_synchronized_revision(&mut self, revision: Revision) -> Result<()> {
        self.state.last_sync_revision = revision;
        self.save()
    }

    /// Returns the revision a note was last synchronized at, or
    /// [`NO_REVISION`] if it never was.
    pub fn revision(&self, uuid: &Uuid) -> Revision {
        self.state.notes.get(uuid).copied().unwrap_or(NO_REVISION)
    }

    pub fn set_revision(&mut self, uuid: Uuid, revision: Revision) -> Result<()> {
        self.state.notes.insert(uuid, revision);
        self.save()
    }

    /// Records several note revisions with a single write.
    pub fn set_revisions(&mut self, revisions: impl IntoIterator<Item = (Uuid, Revision)>) -> Result<()> {
        self.state.notes.extend(revisions);
        self.save()
    }

    pub fn remove_revision(&mut self, uuid: &Uuid) -> Result<()> {
        let pending = self.state.pending_uploads.remove(uuid);
        if self.state.notes.remove(uuid).is_some() || pending {
            self.save()?;
        }
        Ok(())
    }

    /// Returns true if the note's last upload attempt failed.
    pub fn is_pending_upload(&self, uuid: &Uuid) -> bool {
        self.state.pending_uploads.contains(uuid)
    }

    /// Settles an upload pass with a single write.
    ///
    /// Notes in `sent` stop being pending. Each note in `failed` goes back to
    /// the revision it had before the pass, so a note that was never
    /// synchronized stays new, and a previously synchronized one is kept
    /// pending until an upload succeeds.
    pub fn record_uploads(
        &mut self,
        sent: impl IntoIterator<Item = Uuid>,
        failed: impl IntoIterator<Item = (Uuid, Revision)>,
    ) -> Result<()> {
        for uuid in sent {
            self.state.pending_uploads.remove(&uuid);
        }
        for (uuid, previous) in failed {
            if previous == NO_REVISION {
                self.state.notes.remove(&uuid);
                self.state.pending_uploads.remove(&uuid);
            } else {
                self.state.notes.insert(uuid, previous);
                self.state.pending_uploads.insert(uuid);
            }
        }
        self.save()
    }

    /// Returns every note with a known synchronized revision.
    pub fn revisions(&self) -> &BTreeMap<Uuid, Revision> {
        &self.state.notes
    }

    /// Remembers the title of a locally deleted note until the deletion is
    /// pushed to the server.
    pub fn record_deleted_note(&mut self, uuid: Uuid, title: impl Into<String>) -> Result<()> {
        self.state.deleted_notes.insert(uuid, title.into());
        self.save()
    }

    pub fn deleted_note_title(&self, uuid: &Uuid) -> Option<&str> {
        self.state.deleted_notes.get(uuid).map(String::as_str)
    }

    pub fn clear_deleted_notes(&mut self) -> Result<()> {
        if self.state.deleted_notes.is_empty() {
            return Ok(());
        }
        self.state.deleted_notes.clear();
        self.save()
    }

    /// Forgets all sync history, as when switching to another store.
    pub fn reset(&mut self) -> Result<()> {
        self.state = ClientState::default();
        self.save()
    }

    fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.state)?;
        atomic::write(&self.path, json.as_bytes())?;
        self.stamp = stamp_of(&self.path);
        Ok(())
    }
}

fn read_state(path: &Path) -> Result<ClientState> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientState::default()),
        Err(e) => Err(e.into()),
    }
}

fn stamp_of(path: &Path) -> FileStamp {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
