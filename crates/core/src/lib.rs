// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! quire-core: Shared library for quire note synchronization
//!
//! This crate provides the note model, the file-backed local note store, the
//! per-replica client manifest, and the file-system sync server that owns the
//! store-wide lock and the revision-indexed change log.

mod atomic;
pub mod client;
pub mod clock;
pub mod error;
pub mod lock;
pub mod note;
pub mod notes;
pub mod revision;
pub mod server;

pub use client::{SyncClient, CLIENT_MANIFEST};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use lock::{LockClaim, LockObservation, LockVerdict, DEFAULT_LOCK_DURATION, LOCK_FILE};
pub use note::NoteRecord;
pub use notes::{NoteCollection, NoteStore};
pub use revision::{NoteUpdate, Revision, RevisionManifest, NO_REVISION};
pub use server::{FileSystemSyncServer, SyncServer};
