// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session states and per-note outcomes.

use std::fmt;

/// Where a sync session is in its lifecycle.
///
/// A session walks `Connecting → AcquiringLock → PrepareDownload →
/// Downloading → PrepareUpload → Uploading → DeleteServerNotes →
/// CommittingChanges` and ends in one of the terminal states before
/// returning to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    Idle,
    NoConfiguredSyncService,
    SyncServerCreationFailed,
    Connecting,
    AcquiringLock,
    /// Another client holds the store lock.
    Locked,
    PrepareDownload,
    Downloading,
    PrepareUpload,
    Uploading,
    DeleteServerNotes,
    CommittingChanges,
    Succeeded,
    Failed,
    UserCancelled,
}

impl SyncState {
    /// Returns true for states that end a session.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SyncState::NoConfiguredSyncService
                | SyncState::SyncServerCreationFailed
                | SyncState::Locked
                | SyncState::Succeeded
                | SyncState::Failed
                | SyncState::UserCancelled
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::NoConfiguredSyncService => "no sync service is configured",
            SyncState::SyncServerCreationFailed => "could not connect to the sync store",
            SyncState::Connecting => "connecting to the sync store",
            SyncState::AcquiringLock => "acquiring the sync lock",
            SyncState::Locked => "another client is synchronizing; try again later",
            SyncState::PrepareDownload => "checking for new notes",
            SyncState::Downloading => "downloading notes",
            SyncState::PrepareUpload => "collecting local changes",
            SyncState::Uploading => "uploading notes",
            SyncState::DeleteServerNotes => "deleting notes from the sync store",
            SyncState::CommittingChanges => "committing changes",
            SyncState::Succeeded => "synchronization complete",
            SyncState::Failed => "synchronization failed",
            SyncState::UserCancelled => "synchronization cancelled",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// What happened to a single note during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteSyncType {
    DownloadNew,
    DownloadModified,
    UploadNew,
    UploadModified,
    DeleteFromClient,
    DeleteFromServer,
    /// Both sides changed the note since the last sync.
    ConcurrentEdit,
    /// An incoming note could not be applied locally.
    DownloadFailed,
    /// The note could not be written to the store; the next session retries.
    UploadFailed,
    /// The note could not be removed from the store.
    DeleteFromServerFailed,
}

impl NoteSyncType {
    /// Returns true for outcomes where the note did not synchronize.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            NoteSyncType::DownloadFailed | NoteSyncType::UploadFailed | NoteSyncType::DeleteFromServerFailed
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            NoteSyncType::DownloadNew => "added",
            NoteSyncType::DownloadModified => "updated",
            NoteSyncType::UploadNew => "uploaded new",
            NoteSyncType::UploadModified => "uploaded changes",
            NoteSyncType::DeleteFromClient => "deleted locally",
            NoteSyncType::DeleteFromServer => "deleted from store",
            NoteSyncType::ConcurrentEdit => "edited on both sides",
            NoteSyncType::DownloadFailed => "not applied",
            NoteSyncType::UploadFailed => "upload failed",
            NoteSyncType::DeleteFromServerFailed => "delete failed",
        }
    }
}

impl fmt::Display for NoteSyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
