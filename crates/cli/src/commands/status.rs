// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use quire_core::{FileSystemSyncServer, NoteCollection, Revision, SyncClient, SyncServer, NO_REVISION};

use super::{open_replica, Replica};
use crate::colors;
use crate::error::Result;

/// What the replica would send on its next sync, and what the store holds.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Status {
    pub last_sync: Option<DateTime<Utc>>,
    pub last_revision: Revision,
    pub notes: usize,
    /// Never uploaded.
    pub new: usize,
    /// Uploaded before and edited since the last sync.
    pub modified: usize,
    /// Uploaded before and deleted here since.
    pub deleted: usize,
    pub store: StoreStatus,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StoreStatus {
    NotConfigured,
    Unreachable(String),
    Reachable { latest_revision: Revision, locked_by: Option<String> },
}

pub fn run() -> Result<()> {
    let replica = open_replica()?;
    let client = replica.client()?;
    let status = collect(&replica, &client);

    println!("{} {}", colors::header("Client:"), replica.config.client_id());
    match &status.store {
        StoreStatus::NotConfigured => println!("{} not configured", colors::header("Store:")),
        StoreStatus::Unreachable(reason) => println!("{} unreachable ({})", colors::header("Store:"), reason),
        StoreStatus::Reachable { latest_revision, locked_by } => {
            let store = replica.config.store_path(&replica.work_dir).unwrap_or_default();
            println!("{} {} (revision {})", colors::header("Store:"), store.display(), latest_revision);
            if let Some(holder) = locked_by {
                println!("  locked by {}", holder);
            }
        }
    }
    match status.last_sync {
        Some(date) => println!(
            "{} {} (revision {})",
            colors::header("Last sync:"),
            date.format("%Y-%m-%d %H:%M"),
            status.last_revision
        ),
        None => println!("{} never", colors::header("Last sync:")),
    }
    println!(
        "{} {} ({} new, {} modified, {} deleted since last sync)",
        colors::header("Notes:"),
        status.notes,
        status.new,
        status.modified,
        status.deleted
    );
    Ok(())
}

pub(crate) fn collect(replica: &Replica, client: &SyncClient) -> Status {
    let last_sync_date = client.last_sync_date();
    let last_revision = client.last_synchronized_revision();
    let notes = replica.notes.notes();

    let mut new = 0;
    let mut modified = 0;
    for note in &notes {
        if client.revision(&note.uuid) == NO_REVISION {
            new += 1;
        } else if client.is_pending_upload(&note.uuid) || note.change_date > last_sync_date {
            modified += 1;
        }
    }
    let present: HashSet<_> = notes.iter().map(|n| n.uuid).collect();
    let deleted = client
        .revisions()
        .iter()
        .filter(|(uuid, rev)| **rev != NO_REVISION && !present.contains(*uuid))
        .count();

    Status {
        last_sync: (last_revision != NO_REVISION).then_some(last_sync_date),
        last_revision,
        notes: notes.len(),
        new,
        modified,
        deleted,
        store: probe_store(replica),
    }
}

fn probe_store(replica: &Replica) -> StoreStatus {
    let Some(path) = replica.config.store_path(&replica.work_dir) else {
        return StoreStatus::NotConfigured;
    };
    let probe = || -> quire_core::Result<StoreStatus> {
        let server = FileSystemSyncServer::open(&path, replica.config.client_id())?;
        let latest_revision = server.latest_revision()?;
        let locked_by = server.current_sync_lock()?.map(|claim| claim.client_id);
        Ok(StoreStatus::Reachable { latest_revision, locked_by })
    };
    probe().unwrap_or_else(|e| {
        let reason = e.to_string();
        StoreStatus::Unreachable(reason.lines().next().unwrap_or_default().to_string())
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
