// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use quire_core::{Clock, ManualClock, NoteStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    clock: Arc<ManualClock>,
    notes: NoteStore,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
    let notes = NoteStore::open(dir.path(), clock.clone()).unwrap();
    Fixture { _dir: dir, clock, notes }
}

fn modified(note: &NoteRecord, revision: Revision) -> NoteUpdate {
    NoteUpdate::modified(note.uuid, note.to_content().unwrap(), revision).unwrap()
}

#[test]
fn missing_note_is_created() {
    let mut f = fixture();
    let remote = NoteRecord::new("Remote", "hi", f.clock.now());

    let applied = apply_update(&mut f.notes, &modified(&remote, 0), f.clock.now(), false).unwrap();
    assert_eq!(applied, Applied::Created("Remote".into()));
    assert_eq!(f.notes.find_by_uuid(&remote.uuid).unwrap().text, "hi");
}

#[test]
fn tombstone_for_missing_note_is_skipped() {
    let mut f = fixture();
    let update = NoteUpdate::deleted(Uuid::new_v4(), 3);
    assert_eq!(apply_update(&mut f.notes, &update, f.clock.now(), false).unwrap(), Applied::Skipped);
    assert!(f.notes.is_empty());
}

#[test]
fn unmodified_note_is_overwritten() {
    let mut f = fixture();
    let local = f.notes.create("Plans", "old").unwrap();
    let last_sync = f.clock.now();
    let remote = NoteRecord { text: "new".into(), ..local.clone() };

    let applied = apply_update(&mut f.notes, &modified(&remote, 1), last_sync, false).unwrap();
    assert_eq!(applied, Applied::Modified("Plans".into()));
    assert_eq!(f.notes.find_by_uuid(&local.uuid).unwrap().text, "new");
}

#[test]
fn unmodified_note_is_deleted_by_tombstone() {
    let mut f = fixture();
    let local = f.notes.create("Plans", "").unwrap();
    let last_sync = f.clock.now();

    let applied = apply_update(&mut f.notes, &NoteUpdate::deleted(local.uuid, 1), last_sync, false).unwrap();
    assert_eq!(applied, Applied::Deleted("Plans".into()));
    assert!(f.notes.find_by_uuid(&local.uuid).is_none());
}

#[test]
fn concurrent_edit_keeps_local_and_copies_incoming() {
    let mut f = fixture();
    let local = f.notes.create("Plans", "base").unwrap();
    let last_sync = f.clock.now();
    f.clock.advance(Duration::from_secs(10));
    f.notes.edit_text(&local.uuid, "mine").unwrap();
    let remote = NoteRecord { text: "theirs".into(), ..local.clone() };

    let applied = apply_update(&mut f.notes, &modified(&remote, 1), last_sync, false).unwrap();
    assert_eq!(
        applied,
        Applied::ConcurrentEdit { local: "Plans".into(), copy: Some("Plans (conflict)".into()) }
    );
    assert_eq!(f.notes.find_by_uuid(&local.uuid).unwrap().text, "mine");
    assert_eq!(f.notes.find_by_title("Plans (conflict)").unwrap().text, "theirs");
}

#[test]
fn concurrent_identical_edit_is_applied() {
    let mut f = fixture();
    let local = f.notes.create("Plans", "base").unwrap();
    let last_sync = f.clock.now();
    f.clock.advance(Duration::from_secs(10));
    let edited = f.notes.edit_text(&local.uuid, "same").unwrap();

    let applied = apply_update(&mut f.notes, &modified(&edited, 1), last_sync, false).unwrap();
    assert_eq!(applied, Applied::Modified("Plans".into()));
    assert_eq!(f.notes.len(), 1);
}

#[test]
fn modified_note_survives_tombstone() {
    let mut f = fixture();
    let local = f.notes.create("Plans", "").unwrap();
    let last_sync = f.clock.now();
    f.clock.advance(Duration::from_secs(10));
    f.notes.edit_text(&local.uuid, "still needed").unwrap();

    let applied = apply_update(&mut f.notes, &NoteUpdate::deleted(local.uuid, 1), last_sync, false).unwrap();
    assert_eq!(applied, Applied::ConcurrentEdit { local: "Plans".into(), copy: None });
    assert!(f.notes.find_by_uuid(&local.uuid).is_some());
}

#[test]
fn local_changes_split_new_and_modified() {
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let later = base + chrono::TimeDelta::seconds(60);
    let fresh = NoteRecord::new("fresh", "", later);
    let edited = NoteRecord::new("edited", "", later);
    let untouched = NoteRecord::new("untouched", "", base);
    let downloaded = NoteRecord::new("downloaded", "", later);

    let revisions: HashMap<Uuid, Revision> =
        [(edited.uuid, 2), (untouched.uuid, 2), (downloaded.uuid, 5)].into_iter().collect();
    let changes = local_changes(
        vec![fresh.clone(), edited.clone(), untouched, downloaded],
        |uuid| revisions.get(uuid).copied().unwrap_or(NO_REVISION),
        |_| false,
        4,
        base,
    );

    assert_eq!(changes.new, vec![fresh]);
    assert_eq!(changes.modified, vec![edited]);
    assert!(!changes.is_empty());
    assert_eq!(changes.uuids().count(), 2);
}

#[test]
fn pending_upload_counts_as_modified() {
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let stuck = NoteRecord::new("stuck", "", base);
    let untouched = NoteRecord::new("untouched", "", base);

    let changes = local_changes(
        vec![stuck.clone(), untouched.clone()],
        |_| 2,
        |uuid| *uuid == stuck.uuid,
        4,
        base + chrono::TimeDelta::seconds(60),
    );

    assert!(changes.new.is_empty());
    assert_eq!(changes.modified, vec![stuck]);
}

#[test]
fn pending_upload_is_not_overwritten() {
    let mut f = fixture();
    let local = f.notes.create("Plans", "unsent").unwrap();
    f.clock.advance(Duration::from_secs(10));
    let last_sync = f.clock.now();
    let remote = NoteRecord { text: "theirs".into(), ..local.clone() };

    let applied = apply_update(&mut f.notes, &modified(&remote, 1), last_sync, true).unwrap();
    assert_eq!(
        applied,
        Applied::ConcurrentEdit { local: "Plans".into(), copy: Some("Plans (conflict)".into()) }
    );
    assert_eq!(f.notes.find_by_uuid(&local.uuid).unwrap().text, "unsent");
}
