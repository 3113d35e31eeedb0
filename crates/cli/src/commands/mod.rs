// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod init;
pub mod list;
pub mod note;
pub mod show;
pub mod status;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use quire_core::{NoteStore, SyncClient, SystemClock};

use crate::config::{find_work_dir, notes_dir, Config};
use crate::error::Result;

/// An opened replica: its `.quire/` directory, configuration, and notes.
pub struct Replica {
    pub work_dir: PathBuf,
    pub config: Config,
    pub notes: NoteStore,
}

impl Replica {
    /// Opens the replica whose `.quire/` directory is `work_dir`.
    pub fn open(work_dir: PathBuf) -> Result<Self> {
        let config = Config::load(&work_dir)?;
        let notes = NoteStore::open(notes_dir(&work_dir), Arc::new(SystemClock))?;
        Ok(Replica { work_dir, config, notes })
    }

    /// Loads the client manifest kept next to the notes.
    pub fn client(&self) -> Result<SyncClient> {
        Ok(SyncClient::in_dir(self.notes.dir())?)
    }
}

/// Helper to open the replica from the current context.
pub fn open_replica() -> Result<Replica> {
    Replica::open(find_work_dir()?)
}

/// First characters of a UUID, enough to tell notes apart in listings.
pub(crate) fn short_uuid(uuid: &uuid::Uuid) -> String {
    uuid.to_string()[..8].to_string()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
