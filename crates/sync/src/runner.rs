// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The body of a sync session.
//!
//! Runs on a blocking worker. Store access is synchronous; note access goes
//! through the dispatcher; the only waits on async machinery are the
//! conflict handshake and the dispatcher's replies.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use quire_core::{
    Clock, NoteCollection, NoteUpdate, Revision, SyncClient, SyncServer, DEFAULT_LOCK_DURATION, NO_REVISION,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conflict::{apply_resolution, suggest_title, ConflictRequest, ConflictResolution};
use crate::dispatch::NoteDispatcher;
use crate::error::Error;
use crate::observer::SyncEvent;
use crate::provider::SyncServiceProvider;
use crate::reconcile::{apply_update, local_changes, Applied, LocalChanges};
use crate::renewal::LockRenewal;
use crate::session::SyncSession;
use crate::state::{NoteSyncType, SyncState};

/// Title tag suggested when renaming a local note out of the way.
const RENAME_TAG: &str = "old";

/// Why a session stopped before committing.
#[derive(Debug)]
enum Interrupt {
    Cancelled,
    Failed(Error),
}

impl From<Error> for Interrupt {
    fn from(e: Error) -> Self {
        Interrupt::Failed(e)
    }
}

impl From<quire_core::Error> for Interrupt {
    fn from(e: quire_core::Error) -> Self {
        Interrupt::Failed(e.into())
    }
}

type Step<T> = std::result::Result<T, Interrupt>;

pub(crate) struct SessionRunner<C> {
    pub session: Arc<SyncSession>,
    pub provider: Option<Arc<dyn SyncServiceProvider>>,
    pub client: Arc<Mutex<SyncClient>>,
    pub clock: Arc<dyn Clock>,
    pub notes: NoteDispatcher<C>,
    pub events: mpsc::UnboundedSender<SyncEvent>,
    pub runtime: Handle,
}

impl<C: NoteCollection + 'static> SessionRunner<C> {
    /// Runs the session to completion. Consumes the runner, which closes the
    /// event stream once the session is back to idle.
    pub fn run(self) {
        let outcome = self.connect_and_sync();
        info!(%outcome, "sync session finished");
        self.announce(outcome);
        self.session.finish(outcome);
        self.emit(SyncEvent::StateChanged(SyncState::Idle));
    }

    fn connect_and_sync(&self) -> SyncState {
        if self.transition(SyncState::Connecting).is_err() {
            return SyncState::UserCancelled;
        }

        let Some(provider) = self.provider.as_ref().filter(|p| p.is_configured()) else {
            debug!("no configured sync service");
            return SyncState::NoConfiguredSyncService;
        };
        let server = match provider.create_sync_server() {
            Ok(server) => server,
            Err(e) => {
                warn!(provider = provider.id(), error = %e, "could not create sync server");
                return SyncState::SyncServerCreationFailed;
            }
        };

        let outcome = self.locked_session(&server);
        provider.post_sync_cleanup();
        outcome
    }

    fn locked_session(&self, server: &Arc<dyn SyncServer>) -> SyncState {
        if self.transition(SyncState::AcquiringLock).is_err() {
            return SyncState::UserCancelled;
        }
        match server.begin_sync_transaction() {
            Ok(true) => {}
            Ok(false) => return SyncState::Locked,
            Err(e) => {
                warn!(error = %e, "could not acquire sync lock");
                return SyncState::Failed;
            }
        }

        let duration = match server.current_sync_lock() {
            Ok(Some(claim)) => claim.duration,
            _ => DEFAULT_LOCK_DURATION,
        };
        let renewal = LockRenewal::spawn(&self.runtime, Arc::clone(server), duration);
        let result = self.synchronize(server.as_ref());
        drop(renewal);

        match result {
            Ok(true) => SyncState::Succeeded,
            Ok(false) => SyncState::Failed,
            Err(interrupt) => {
                let outcome = match interrupt {
                    Interrupt::Cancelled => SyncState::UserCancelled,
                    Interrupt::Failed(e) => {
                        warn!(error = %e, "sync session failed");
                        SyncState::Failed
                    }
                };
                if let Err(e) = server.cancel_sync_transaction() {
                    warn!(error = %e, "could not cancel sync transaction");
                }
                outcome
            }
        }
    }

    /// Runs the download, upload and commit phases inside the transaction.
    ///
    /// Returns whether the commit succeeded.
    fn synchronize(&self, server: &dyn SyncServer) -> Step<bool> {
        self.transition(SyncState::PrepareDownload)?;
        let (last_revision, last_sync) = {
            let mut client = self.client();
            client.reload_if_changed()?;
            (client.last_synchronized_revision(), client.last_sync_date())
        };
        let new_revision = server.latest_revision()? + 1;

        let mut updates: Vec<NoteUpdate> = server.note_updates_since(last_revision)?.into_values().collect();
        updates.sort_by(|a, b| a.revision.cmp(&b.revision).then(a.uuid.cmp(&b.uuid)));
        debug!(last_revision, new_revision, updates = updates.len(), "fetched server updates");
        self.resolve_title_conflicts(&updates)?;

        self.transition(SyncState::Downloading)?;
        self.download(updates, last_sync)?;

        self.transition(SyncState::PrepareUpload)?;
        let notes = self.notes.call(|notes: &mut C| notes.notes())?;
        let changes = {
            let client = self.client();
            local_changes(
                notes,
                |uuid| client.revision(uuid),
                |uuid| client.is_pending_upload(uuid),
                last_revision,
                last_sync,
            )
        };

        self.transition(SyncState::Uploading)?;
        let stamped = self.stamp(&changes, new_revision)?;
        let pushed = self.push(server, &changes);

        // Stamps only stick for notes that went out in a committed revision
        if !stamped.is_empty() {
            let sent = match &pushed {
                Ok((true, sent)) => sent.clone(),
                _ => HashSet::new(),
            };
            let failed = stamped.into_iter().filter(|(uuid, _)| !sent.contains(uuid));
            self.client().record_uploads(sent.iter().copied(), failed)?;
        }
        let (committed, _) = pushed?;

        let latest = server.latest_revision()?;
        let mut client = self.client();
        client.set_last_synchronized_revision(latest)?;
        client.set_last_sync_date(self.clock.now())?;
        if committed {
            client.clear_deleted_notes()?;
        }
        Ok(committed)
    }

    /// Stamps local changes with the revision they are about to be committed
    /// at and returns the revisions they had before.
    fn stamp(&self, changes: &LocalChanges, new_revision: Revision) -> Step<Vec<(Uuid, Revision)>> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }
        let mut client = self.client();
        let previous: Vec<(Uuid, Revision)> = changes.uuids().map(|uuid| (uuid, client.revision(&uuid))).collect();
        client.set_revisions(changes.uuids().map(|uuid| (uuid, new_revision)))?;
        Ok(previous)
    }

    /// Uploads local changes, deletes server notes and commits.
    ///
    /// Returns whether the commit succeeded and which notes were uploaded.
    fn push(&self, server: &dyn SyncServer, changes: &LocalChanges) -> Step<(bool, HashSet<Uuid>)> {
        let mut sent = HashSet::new();
        for (notes, kind) in [(&changes.new, NoteSyncType::UploadNew), (&changes.modified, NoteSyncType::UploadModified)] {
            if notes.is_empty() {
                continue;
            }
            let uploaded: HashSet<Uuid> = server.upload_notes(notes)?.into_iter().collect();
            for note in notes {
                if uploaded.contains(&note.uuid) {
                    self.note_synchronized(&note.title, kind);
                } else {
                    self.note_synchronized(&note.title, NoteSyncType::UploadFailed);
                }
            }
            sent.extend(uploaded);
        }

        self.transition(SyncState::DeleteServerNotes)?;
        self.delete_server_notes(server)?;

        self.transition(SyncState::CommittingChanges)?;
        let committed = server.commit_sync_transaction()?;
        Ok((committed, sent))
    }

    /// Raises a conflict for every incoming new note whose title is taken by
    /// a different local note, and applies each answer.
    fn resolve_title_conflicts(&self, updates: &[NoteUpdate]) -> Step<()> {
        for update in updates.iter().filter(|u| !u.is_tombstone()) {
            let uuid = update.uuid;
            let title = update.title.clone();
            let clash = self.notes.call(move |notes: &mut C| {
                if notes.find_by_uuid(&uuid).is_some() {
                    return None;
                }
                let existing = notes.find_by_title(&title)?.clone();
                let suggested = suggest_title(notes, &existing.title, RENAME_TAG);
                Some((existing, suggested))
            })?;
            let Some((local, suggested)) = clash else {
                continue;
            };

            info!(title = %local.title, "incoming note conflicts with a local note");
            let local_uuid = local.uuid;
            let local_title = local.title.clone();
            let resolution = self.ask(local, update.clone(), suggested);
            if resolution == ConflictResolution::Cancel {
                return Err(Interrupt::Cancelled);
            }

            debug!(?resolution, "applying conflict resolution");
            let answer = resolution.clone();
            self.notes.call(move |notes: &mut C| apply_resolution(notes, &local_uuid, &answer))??;
            if resolution == ConflictResolution::DeleteExisting {
                let mut client = self.client();
                if client.revision(&local_uuid) != NO_REVISION {
                    client.record_deleted_note(local_uuid, local_title)?;
                }
            }
        }
        Ok(())
    }

    /// Hands a conflict to the note owner and blocks until it is answered
    /// or the session is cancelled.
    fn ask(&self, local: quire_core::NoteRecord, incoming: NoteUpdate, suggested: String) -> ConflictResolution {
        let (request, response) = ConflictRequest::new(local, incoming, suggested);
        self.emit(SyncEvent::ConflictDetected(request));

        let session = Arc::clone(&self.session);
        self.runtime.block_on(async move {
            tokio::select! {
                answer = response => answer.unwrap_or(ConflictResolution::Cancel),
                () = session.cancelled() => ConflictResolution::Cancel,
            }
        })
    }

    fn download(&self, updates: Vec<NoteUpdate>, last_sync: DateTime<Utc>) -> Step<()> {
        let mut synced: Vec<(Uuid, Revision)> = Vec::new();
        let mut removed: Vec<Uuid> = Vec::new();

        for update in updates {
            if self.session.is_cancelled() {
                break;
            }
            let (uuid, revision) = (update.uuid, update.revision);
            let incoming_title = update.title.clone();
            let pending_upload = self.client().is_pending_upload(&uuid);
            let applied =
                self.notes.call(move |notes: &mut C| apply_update(notes, &update, last_sync, pending_upload))?;
            match applied {
                Ok(Applied::Created(title)) => {
                    synced.push((uuid, revision));
                    self.note_synchronized(&title, NoteSyncType::DownloadNew);
                }
                Ok(Applied::Modified(title)) => {
                    synced.push((uuid, revision));
                    self.note_synchronized(&title, NoteSyncType::DownloadModified);
                }
                Ok(Applied::Deleted(title)) => {
                    removed.push(uuid);
                    self.note_synchronized(&title, NoteSyncType::DeleteFromClient);
                }
                Ok(Applied::Skipped) => {}
                Ok(Applied::ConcurrentEdit { local, copy }) => {
                    info!(title = %local, copy = ?copy, "note was edited on both sides");
                    self.note_synchronized(&local, NoteSyncType::ConcurrentEdit);
                }
                Err(e) => {
                    warn!(%uuid, error = %e, "could not apply incoming note");
                    let title = if incoming_title.is_empty() { uuid.to_string() } else { incoming_title };
                    self.note_synchronized(&title, NoteSyncType::DownloadFailed);
                }
            }
        }

        // Record what was applied even when cancelled part way through
        let mut client = self.client();
        if !synced.is_empty() {
            client.set_revisions(synced)?;
        }
        for uuid in &removed {
            client.remove_revision(uuid)?;
        }
        drop(client);

        if self.session.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        Ok(())
    }

    /// Deletes from the store every note this replica synchronized before
    /// and no longer has.
    fn delete_server_notes(&self, server: &dyn SyncServer) -> Step<()> {
        let on_server = server.all_note_uuids()?;
        let local: HashSet<Uuid> =
            self.notes.call(|notes: &mut C| notes.notes().into_iter().map(|n| n.uuid).collect())?;

        let mut doomed: Vec<Uuid> = {
            let client = self.client();
            on_server
                .difference(&local)
                .filter(|uuid| client.revision(uuid) != NO_REVISION)
                .copied()
                .collect()
        };
        if doomed.is_empty() {
            return Ok(());
        }
        doomed.sort();

        let deleted: HashSet<Uuid> = server.delete_notes(&doomed)?.into_iter().collect();
        let mut client = self.client();
        let mut outcomes = Vec::with_capacity(doomed.len());
        for uuid in &doomed {
            let title = client.deleted_note_title(uuid).map_or_else(|| uuid.to_string(), str::to_string);
            if deleted.contains(uuid) {
                client.remove_revision(uuid)?;
                outcomes.push((title, NoteSyncType::DeleteFromServer));
            } else {
                outcomes.push((title, NoteSyncType::DeleteFromServerFailed));
            }
        }
        drop(client);

        for (title, kind) in outcomes {
            self.note_synchronized(&title, kind);
        }
        Ok(())
    }

    /// Moves to `state`, unless the session was cancelled.
    fn transition(&self, state: SyncState) -> Step<()> {
        if self.session.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        self.announce(state);
        Ok(())
    }

    fn announce(&self, state: SyncState) {
        debug!(?state, "sync state changed");
        self.session.set_state(state);
        self.emit(SyncEvent::StateChanged(state));
    }

    fn note_synchronized(&self, title: &str, kind: NoteSyncType) {
        self.emit(SyncEvent::NoteSynchronized { title: title.to_string(), kind });
    }

    fn emit(&self, event: SyncEvent) {
        if self.events.send(event).is_err() {
            debug!("nobody is listening for sync events");
        }
    }

    fn client(&self) -> MutexGuard<'_, SyncClient> {
        self.client.lock().unwrap_or_else(|e| e.into_inner())
    }
}
