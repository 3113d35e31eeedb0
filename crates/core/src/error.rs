// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for quire-core operations.

use thiserror::Error;

/// All possible errors that can occur in quire-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("note not found: {0}")]
    NoteNotFound(String),

    #[error("a note titled '{0}' already exists\n  hint: pick another title or rename the existing note")]
    TitleInUse(String),

    #[error("invalid note: {0}")]
    InvalidNote(String),

    #[error("sync store not found: {0}\n  hint: check that the shared folder exists and is mounted")]
    StoreNotFound(String),

    #[error("no sync transaction is open")]
    NoTransaction,

    #[error("a sync transaction is already open")]
    TransactionOpen,

    #[error("sync lock lost: {0}")]
    LockLost(String),

    #[error("revision {0} already exists in the sync store")]
    RevisionExists(i64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid uuid: {0}")]
    Uuid(#[from] uuid::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for quire-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
