// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::conflict::{ConflictRequest, ConflictResolution};
use crate::state::{NoteSyncType, SyncState};

#[derive(Default)]
struct Recorder {
    states: Vec<SyncState>,
    notes: Vec<(String, NoteSyncType)>,
}

impl SyncObserver<Vec<String>> for Recorder {
    fn state_changed(&mut self, state: SyncState) {
        self.states.push(state);
    }

    fn note_synchronized(&mut self, title: &str, kind: NoteSyncType) {
        self.notes.push((title.to_string(), kind));
    }

    fn conflict_detected(&mut self, _notes: &Vec<String>, request: ConflictRequest) {
        request.respond(ConflictResolution::Cancel);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn call_runs_on_owner() {
    let mut owner = NoteOwner::new(vec!["a".to_string()]);
    let dispatcher = owner.dispatcher();
    let (events_tx, events) = mpsc::unbounded_channel();

    let worker = tokio::task::spawn_blocking(move || {
        dispatcher.call(|notes: &mut Vec<String>| notes.push("b".to_string())).unwrap();
        let len = dispatcher.call(|notes: &mut Vec<String>| notes.len()).unwrap();
        drop(events_tx);
        len
    });

    owner.drive(events, &mut Recorder::default()).await;
    assert_eq!(worker.await.unwrap(), 2);
    assert_eq!(owner.into_inner(), vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn drive_delivers_events_in_order() {
    let mut owner = NoteOwner::new(Vec::<String>::new());
    let (events_tx, events) = mpsc::unbounded_channel();
    events_tx.send(SyncEvent::StateChanged(SyncState::Connecting)).unwrap();
    events_tx
        .send(SyncEvent::NoteSynchronized { title: "x".into(), kind: NoteSyncType::DownloadNew })
        .unwrap();
    events_tx.send(SyncEvent::StateChanged(SyncState::Succeeded)).unwrap();
    drop(events_tx);

    let mut recorder = Recorder::default();
    owner.drive(events, &mut recorder).await;

    assert_eq!(recorder.states, vec![SyncState::Connecting, SyncState::Succeeded]);
    assert_eq!(recorder.notes, vec![("x".to_string(), NoteSyncType::DownloadNew)]);
}

#[test]
fn call_fails_once_owner_is_gone() {
    let owner = NoteOwner::new(Vec::<String>::new());
    let dispatcher = owner.dispatcher();
    drop(owner);

    let err = dispatcher.call(|notes: &mut Vec<String>| notes.len()).unwrap_err();
    assert!(matches!(err, Error::CollectionClosed));
}

#[test]
fn run_pending_drains_queue() {
    let mut owner = NoteOwner::new(0u32);
    let dispatcher = owner.dispatcher();
    let worker = std::thread::spawn(move || dispatcher.call(|n: &mut u32| *n += 1));

    // Wait for the job to be queued
    while owner.run_pending() == 0 {
        std::thread::yield_now();
    }
    worker.join().unwrap().unwrap();
    assert_eq!(*owner.notes(), 1);
}
