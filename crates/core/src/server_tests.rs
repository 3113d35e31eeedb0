// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::clock::ManualClock;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn note(title: &str, text: &str) -> NoteRecord {
    NoteRecord::new(title, text, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

fn server(dir: &TempDir, client: &str) -> FileSystemSyncServer {
    FileSystemSyncServer::open(dir.path(), client).unwrap()
}

/// Runs one transaction uploading `notes` and deleting `deleted`.
fn commit(dir: &TempDir, notes: &[NoteRecord], deleted: &[Uuid]) {
    let s = server(dir, "writer");
    assert!(s.begin_sync_transaction().unwrap());
    s.upload_notes(notes).unwrap();
    s.delete_notes(deleted).unwrap();
    assert!(s.commit_sync_transaction().unwrap());
}

#[test]
fn open_requires_existing_directory() {
    let dir = TempDir::new().unwrap();
    let err = FileSystemSyncServer::open(dir.path().join("missing"), "a").err().unwrap();
    assert!(matches!(err, Error::StoreNotFound(_)));
}

#[test]
fn empty_store_has_no_revision() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert_eq!(s.latest_revision().unwrap(), NO_REVISION);
    assert!(s.note_updates_since(NO_REVISION).unwrap().is_empty());
    assert!(s.all_note_uuids().unwrap().is_empty());
    assert!(s.current_sync_lock().unwrap().is_none());
}

#[test]
fn begin_publishes_lock_for_next_revision() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "alice").with_lock_duration(Duration::from_secs(45));
    assert!(s.begin_sync_transaction().unwrap());

    let lock = s.current_sync_lock().unwrap().unwrap();
    assert_eq!(lock.client_id, "alice");
    assert_eq!(lock.renew_count, 0);
    assert_eq!(lock.revision, 0);
    assert_eq!(lock.duration, Duration::from_secs(45));
}

#[test]
fn begin_twice_is_an_error() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert!(s.begin_sync_transaction().unwrap());
    assert!(matches!(s.begin_sync_transaction(), Err(Error::TransactionOpen)));
}

#[test]
fn writes_require_a_transaction() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert!(matches!(s.upload_notes(&[note("x", "")]), Err(Error::NoTransaction)));
    assert!(matches!(s.delete_notes(&[Uuid::new_v4()]), Err(Error::NoTransaction)));
    assert!(matches!(s.commit_sync_transaction(), Err(Error::NoTransaction)));
    assert!(matches!(s.renew_sync_lock(), Err(Error::NoTransaction)));
    assert!(!s.cancel_sync_transaction().unwrap());
}

#[test]
fn commit_with_changes_advances_revision_by_one() {
    let dir = TempDir::new().unwrap();
    commit(&dir, &[note("a", "1")], &[]);
    assert_eq!(server(&dir, "x").latest_revision().unwrap(), 0);

    commit(&dir, &[note("b", "2")], &[]);
    let s = server(&dir, "x");
    assert_eq!(s.latest_revision().unwrap(), 1);
    assert!(s.current_sync_lock().unwrap().is_none());
}

#[test]
fn commit_without_changes_keeps_revision() {
    let dir = TempDir::new().unwrap();
    commit(&dir, &[note("a", "1")], &[]);
    commit(&dir, &[], &[]);

    let s = server(&dir, "x");
    assert_eq!(s.latest_revision().unwrap(), 0);
    assert!(s.current_sync_lock().unwrap().is_none());
}

#[test]
fn uploaded_notes_round_trip() {
    let dir = TempDir::new().unwrap();
    let notes = vec![note("one", "first"), note("two", "second"), note("three", "third")];
    commit(&dir, &notes, &[]);

    let s = server(&dir, "reader");
    let updates = s.note_updates_since(NO_REVISION).unwrap();
    assert_eq!(updates.len(), 3);
    for n in &notes {
        let update = &updates[&n.uuid];
        assert_eq!(update.revision, 0);
        assert_eq!(update.title, n.title);
        assert_eq!(update.content.as_deref(), Some(n.to_content().unwrap().as_str()));
    }
    assert_eq!(s.all_note_uuids().unwrap(), notes.iter().map(|n| n.uuid).collect());
}

#[test]
fn updates_since_is_idempotent() {
    let dir = TempDir::new().unwrap();
    commit(&dir, &[note("one", "1")], &[]);
    commit(&dir, &[note("two", "2")], &[]);

    let s = server(&dir, "reader");
    assert_eq!(s.note_updates_since(NO_REVISION).unwrap(), s.note_updates_since(NO_REVISION).unwrap());
}

#[test]
fn updates_since_skips_seen_revisions() {
    let dir = TempDir::new().unwrap();
    let first = note("one", "1");
    let second = note("two", "2");
    commit(&dir, std::slice::from_ref(&first), &[]);
    commit(&dir, std::slice::from_ref(&second), &[]);

    let updates = server(&dir, "reader").note_updates_since(0).unwrap();
    assert_eq!(updates.keys().copied().collect::<Vec<_>>(), vec![second.uuid]);
    assert!(server(&dir, "reader").note_updates_since(1).unwrap().is_empty());
}

#[test]
fn newest_change_wins() {
    let dir = TempDir::new().unwrap();
    let x = note("X", "v1");
    let y = note("Y", "temp");
    commit(&dir, &[x.clone(), y.clone()], &[]);
    let x2 = NoteRecord { text: "v2".into(), ..x.clone() };
    commit(&dir, std::slice::from_ref(&x2), &[]);
    commit(&dir, &[], &[y.uuid]);

    let updates = server(&dir, "reader").note_updates_since(NO_REVISION).unwrap();
    assert_eq!(updates[&x.uuid].revision, 1);
    assert_eq!(updates[&x.uuid].content.as_deref(), Some(x2.to_content().unwrap().as_str()));
    assert!(updates[&y.uuid].is_tombstone());
    assert_eq!(updates[&y.uuid].revision, 2);
}

#[test]
fn delete_removes_blob() {
    let dir = TempDir::new().unwrap();
    let x = note("X", "");
    commit(&dir, std::slice::from_ref(&x), &[]);
    commit(&dir, &[], &[x.uuid]);

    let s = server(&dir, "reader");
    assert!(s.all_note_uuids().unwrap().is_empty());
    let manifest = RevisionManifest::load(dir.path(), 1).unwrap();
    assert_eq!(manifest.deleted, vec![x.uuid]);
    assert!(manifest.updated.is_empty());
}

#[test]
fn cancel_releases_lock_without_revision() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert!(s.begin_sync_transaction().unwrap());
    s.upload_notes(&[note("x", "")]).unwrap();

    assert!(s.cancel_sync_transaction().unwrap());
    assert!(s.current_sync_lock().unwrap().is_none());
    assert_eq!(s.latest_revision().unwrap(), NO_REVISION);
    assert!(s.begin_sync_transaction().unwrap());
}

#[test]
fn live_lock_blocks_other_clients() {
    let dir = TempDir::new().unwrap();
    let holder = server(&dir, "holder");
    assert!(holder.begin_sync_transaction().unwrap());

    let other = server(&dir, "other");
    assert!(!other.begin_sync_transaction().unwrap());
    assert_eq!(other.current_sync_lock().unwrap().unwrap().client_id, "holder");
}

#[test]
fn stale_lock_is_broken_after_duration() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::default());
    let holder = server(&dir, "holder").with_lock_duration(Duration::from_secs(60));
    assert!(holder.begin_sync_transaction().unwrap());

    let other = server(&dir, "other").with_clock(clock.clone());
    assert!(!other.begin_sync_transaction().unwrap());
    clock.advance(Duration::from_secs(59));
    assert!(!other.begin_sync_transaction().unwrap());
    clock.advance(Duration::from_secs(1));
    assert!(other.begin_sync_transaction().unwrap());

    assert_eq!(other.current_sync_lock().unwrap().unwrap().client_id, "other");
}

#[test]
fn renewed_lock_is_never_broken() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::default());
    let holder = server(&dir, "holder").with_lock_duration(Duration::from_secs(60));
    assert!(holder.begin_sync_transaction().unwrap());

    let other = server(&dir, "other").with_clock(clock.clone());
    for _ in 0..5 {
        assert!(!other.begin_sync_transaction().unwrap());
        clock.advance(Duration::from_secs(45));
        holder.renew_sync_lock().unwrap();
    }
    assert!(!other.begin_sync_transaction().unwrap());
    assert_eq!(holder.current_sync_lock().unwrap().unwrap().renew_count, 5);
}

#[test]
fn observation_carries_across_server_instances() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::default());
    let observation = Arc::new(Mutex::new(LockObservation::new()));
    let holder = server(&dir, "holder").with_lock_duration(Duration::from_secs(60));
    assert!(holder.begin_sync_transaction().unwrap());

    let attempt = || {
        server(&dir, "other")
            .with_clock(clock.clone())
            .with_observation(observation.clone())
            .begin_sync_transaction()
            .unwrap()
    };
    assert!(!attempt());
    clock.advance(Duration::from_secs(61));
    assert!(attempt());
}

#[test]
fn unparseable_lock_waits_default_duration() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(LOCK_FILE), "garbage").unwrap();
    let clock = Arc::new(ManualClock::default());
    let s = server(&dir, "a").with_clock(clock.clone());

    assert!(!s.begin_sync_transaction().unwrap());
    clock.advance(DEFAULT_LOCK_DURATION - Duration::from_secs(1));
    assert!(!s.begin_sync_transaction().unwrap());
    clock.advance(Duration::from_secs(1));
    assert!(s.begin_sync_transaction().unwrap());
}

#[test]
fn renew_increments_count_and_keeps_transaction() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert!(s.begin_sync_transaction().unwrap());
    let before = s.current_sync_lock().unwrap().unwrap();

    let renewed = s.renew_sync_lock().unwrap();
    assert_eq!(renewed.renew_count, 1);
    assert_eq!(renewed.transaction_id, before.transaction_id);
    assert_eq!(s.current_sync_lock().unwrap().unwrap(), renewed);
}

#[test]
fn renew_fails_when_lock_was_taken_over() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert!(s.begin_sync_transaction().unwrap());
    let usurper = LockClaim::new("b", 0, DEFAULT_LOCK_DURATION);
    fs::write(s.lock_path(), usurper.to_json().unwrap()).unwrap();

    assert!(matches!(s.renew_sync_lock(), Err(Error::LockLost(_))));
    assert!(matches!(s.commit_sync_transaction(), Err(Error::LockLost(_))));

    // Cancelling must not remove the other client's lock
    assert!(s.cancel_sync_transaction().unwrap());
    assert_eq!(s.current_sync_lock().unwrap().unwrap(), usurper);
}

#[test]
fn commit_failure_leaves_lock_in_place() {
    let dir = TempDir::new().unwrap();
    let s = server(&dir, "a");
    assert!(s.begin_sync_transaction().unwrap());
    s.upload_notes(&[note("x", "")]).unwrap();

    // A plain file where the bucket directory belongs makes the write fail
    fs::write(dir.path().join("0"), "").unwrap();

    assert!(!s.commit_sync_transaction().unwrap());
    assert_eq!(s.current_sync_lock().unwrap().unwrap().client_id, "a");
}

#[test]
fn latest_revision_scans_buckets() {
    let dir = TempDir::new().unwrap();
    for rev in [0, 99, 100, 205] {
        RevisionManifest { revision: rev, updated: vec![Uuid::new_v4()], deleted: Vec::new() }
            .write(dir.path())
            .unwrap();
    }
    fs::create_dir(dir.path().join("7")).unwrap();
    fs::create_dir(dir.path().join("notes")).unwrap();

    assert_eq!(server(&dir, "a").latest_revision().unwrap(), 205);
}

#[test]
fn unreadable_blob_is_skipped() {
    let dir = TempDir::new().unwrap();
    let good = note("good", "");
    let bad = note("bad", "");
    commit(&dir, &[good.clone(), bad.clone()], &[]);
    fs::write(dir.path().join(bad.file_name()), "{").unwrap();

    let updates = server(&dir, "reader").note_updates_since(NO_REVISION).unwrap();
    assert!(updates.contains_key(&good.uuid));
    assert!(!updates.contains_key(&bad.uuid));
}
