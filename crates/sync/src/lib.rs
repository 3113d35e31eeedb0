// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! quire-sync: the synchronization engine.
//!
//! A [`SyncManager`] runs one sync session at a time on a blocking worker.
//! The session talks to a [`SyncServer`](quire_core::SyncServer) created by
//! the configured [`SyncServiceProvider`], while every access to the local
//! notes is marshaled through a [`NoteDispatcher`] to whichever task owns
//! the collection (see [`NoteOwner`]). Progress, per-note results and title
//! conflicts are delivered to that same owner as [`SyncEvent`]s.

mod conflict;
mod dispatch;
mod error;
mod manager;
mod observer;
mod provider;
mod reconcile;
mod renewal;
mod runner;
mod session;
mod state;

pub use conflict::{suggest_title, ConflictRequest, ConflictResolution};
pub use dispatch::{NoteDispatcher, NoteOwner};
pub use error::{Error, Result};
pub use manager::{SyncManager, SyncStart};
pub use observer::{SyncEvent, SyncObserver};
pub use provider::{LocalFolderProvider, SyncServiceProvider};
pub use renewal::{renewal_interval, LockRenewal, RENEWAL_MARGIN};
pub use session::SyncSession;
pub use state::{NoteSyncType, SyncState};
