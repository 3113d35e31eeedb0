// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `quire sync`: one session against the configured store.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use quire_core::{LockObservation, NoteStore, SyncClient};
use quire_sync::{LocalFolderProvider, NoteOwner, SyncManager, SyncObserver, SyncServiceProvider, SyncStart, SyncState};

use super::{open_replica, Replica};
use crate::cli::ConflictPolicy;
use crate::config::{lock_observation_path, sync_lock_path};
use crate::error::{Error, Result};
use crate::prompt::TerminalObserver;

pub fn run(policy: ConflictPolicy) -> Result<()> {
    let replica = open_replica()?;
    let _lock = acquire_sync_lock(&replica.work_dir)?;
    let provider = provider_for(&replica);
    let client = replica.client()?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let mut observer = TerminalObserver::new(policy);
    let outcome = runtime.block_on(sync_notes(replica.notes, client, provider.clone(), &mut observer))?;
    save_lock_observation(&replica.work_dir, &provider.observation())?;

    match outcome {
        SyncState::Succeeded if observer.failed() > 0 => {
            println!("Sync complete; {} note(s) will be retried next time.", observer.failed());
            Ok(())
        }
        SyncState::Succeeded if observer.synchronized() == 0 => {
            println!("Already up to date.");
            Ok(())
        }
        SyncState::Succeeded => {
            println!("Sync complete.");
            Ok(())
        }
        other => Err(Error::SyncIncomplete(other)),
    }
}

/// Builds the provider for the replica's configured store.
///
/// The provider picks up watching a foreign store lock where the previous
/// run left off, so a lock abandoned by a crashed client expires across
/// separate `quire sync` invocations.
pub(crate) fn provider_for(replica: &Replica) -> Arc<LocalFolderProvider> {
    let config = &replica.config;
    let provider = LocalFolderProvider::new(config.store_path(&replica.work_dir), config.client_id())
        .with_lock_duration(config.lock_duration())
        .with_observation(load_lock_observation(&replica.work_dir));
    Arc::new(provider)
}

pub(crate) fn load_lock_observation(work_dir: &Path) -> LockObservation {
    let path = lock_observation_path(work_dir);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return LockObservation::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read store lock observation");
            return LockObservation::new();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt store lock observation");
        LockObservation::new()
    })
}

/// Persists the observation, or removes the file once no lock is watched.
pub(crate) fn save_lock_observation(work_dir: &Path, observation: &LockObservation) -> Result<()> {
    let path = lock_observation_path(work_dir);
    if observation.is_empty() {
        return match fs::remove_file(&path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        };
    }
    fs::write(&path, serde_json::to_string_pretty(observation)?)?;
    Ok(())
}

/// Runs one session to completion and returns how it ended.
///
/// The notes are served from the calling task while the session works on a
/// blocking thread.
pub(crate) async fn sync_notes<O: SyncObserver<NoteStore>>(
    notes: NoteStore,
    client: SyncClient,
    provider: Arc<dyn SyncServiceProvider>,
    observer: &mut O,
) -> Result<SyncState> {
    let manager = SyncManager::new(client).with_provider(provider);
    let mut owner = NoteOwner::new(notes);
    let session = match manager.start(owner.dispatcher())? {
        SyncStart::Started { session, events } => {
            owner.drive(events, observer).await;
            session
        }
        SyncStart::AlreadyRunning(session) => session,
    };
    Ok(session.wait().await)
}

/// Keeps two `quire sync` runs in the same replica from overlapping.
fn acquire_sync_lock(work_dir: &Path) -> Result<File> {
    use fs2::FileExt;

    let path = sync_lock_path(work_dir);
    let file = fs::OpenOptions::new().create(true).truncate(false).write(true).open(&path)?;
    file.try_lock_exclusive().map_err(|_| Error::SyncInProgress(path.display().to_string()))?;
    Ok(file)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
