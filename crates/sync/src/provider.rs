// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync service providers.
//!
//! A provider knows how to reach one kind of shared store. The session asks
//! it for a fresh [`SyncServer`] each time and calls
//! [`post_sync_cleanup`](SyncServiceProvider::post_sync_cleanup) when done.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quire_core::{Clock, FileSystemSyncServer, LockObservation, SyncServer, SystemClock, DEFAULT_LOCK_DURATION};

use crate::error::{Error, Result};

/// A way of reaching a shared sync store.
pub trait SyncServiceProvider: Send + Sync {
    /// Short stable identifier, e.g. `"local"`.
    fn id(&self) -> &str;

    /// Returns true when enough settings exist to attempt a connection.
    fn is_configured(&self) -> bool;

    /// Connects to the store.
    fn create_sync_server(&self) -> Result<Arc<dyn SyncServer>>;

    /// Releases whatever `create_sync_server` set up.
    fn post_sync_cleanup(&self) {}
}

/// Syncs through a directory visible to every participant.
pub struct LocalFolderProvider {
    path: Option<PathBuf>,
    client_id: String,
    lock_duration: Duration,
    clock: Arc<dyn Clock>,
    observation: Arc<Mutex<LockObservation>>,
}

impl LocalFolderProvider {
    pub fn new(path: Option<PathBuf>, client_id: impl Into<String>) -> Self {
        LocalFolderProvider {
            path,
            client_id: client_id.into(),
            lock_duration: DEFAULT_LOCK_DURATION,
            clock: Arc::new(SystemClock),
            observation: Arc::new(Mutex::new(LockObservation::new())),
        }
    }

    pub fn with_lock_duration(mut self, duration: Duration) -> Self {
        self.lock_duration = duration;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Resumes watching a foreign lock from an earlier process.
    pub fn with_observation(mut self, observation: LockObservation) -> Self {
        self.observation = Arc::new(Mutex::new(observation));
        self
    }

    /// Returns what this provider's servers have seen of foreign locks, for
    /// callers that need to carry it into a later process.
    pub fn observation(&self) -> LockObservation {
        self.observation.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl SyncServiceProvider for LocalFolderProvider {
    fn id(&self) -> &str {
        "local"
    }

    fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    fn create_sync_server(&self) -> Result<Arc<dyn SyncServer>> {
        let path = self.path.as_ref().ok_or(Error::NotConfigured)?;
        let server = FileSystemSyncServer::open(path, self.client_id.clone())?
            .with_lock_duration(self.lock_duration)
            .with_clock(Arc::clone(&self.clock))
            .with_observation(Arc::clone(&self.observation));
        tracing::debug!(path = %path.display(), client = %self.client_id, "opened local sync store");
        Ok(Arc::new(server))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
