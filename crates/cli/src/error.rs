// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use quire_sync::SyncState;
use thiserror::Error;

/// All possible errors that can occur in the quire CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'quire init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error(transparent)]
    Core(#[from] quire_core::Error),

    #[error(transparent)]
    Sync(#[from] quire_sync::Error),

    #[error("a sync is already running in this replica (lock held on {0})\n  hint: wait for the other `quire sync` to finish")]
    SyncInProgress(String),

    #[error("sync did not complete: {}", .0.description())]
    SyncIncomplete(SyncState),

    #[error("invalid lock duration: {0}s\n  hint: the lock duration must be at least {min}s", min = crate::config::MIN_LOCK_DURATION_SECS)]
    LockDurationTooShort(u64),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
