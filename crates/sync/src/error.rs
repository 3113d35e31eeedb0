// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for quire-sync.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] quire_core::Error),

    #[error("the note collection is no longer being served")]
    CollectionClosed,

    #[error("sync must be started from inside a tokio runtime")]
    NoRuntime,

    #[error("no sync service is configured\n  hint: set a shared folder with `quire config store <path>`")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
