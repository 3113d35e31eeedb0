// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The shared store a group of replicas synchronizes through.
//!
//! [`SyncServer`] is the contract the sync engine drives. The only built-in
//! implementation, [`FileSystemSyncServer`], keeps everything in a plain
//! directory that every participant can read and write:
//!
//! ```text
//! <store>/lock                    JSON LockClaim of the open transaction
//! <store>/<uuid>.note             current note blobs
//! <store>/<rev/100>/<rev>.rev     revision manifests
//! ```
//!
//! Writes happen only inside a transaction. A transaction starts by
//! publishing the lock, uploads and deletes note blobs, and ends by writing
//! the manifest for the next revision and removing the lock.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::atomic;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::lock::{LockClaim, LockObservation, LockVerdict, DEFAULT_LOCK_DURATION, LOCK_FILE};
use crate::note::{self, NoteRecord};
use crate::revision::{self, NoteUpdate, Revision, RevisionManifest, MANIFEST_EXTENSION, NO_REVISION};

/// Operations on a shared sync store.
///
/// Implementations are shared between the session worker and the lock
/// renewal task, so every method takes `&self`.
pub trait SyncServer: Send + Sync {
    /// Tries to take the store-wide lock.
    ///
    /// Returns false when another live transaction holds it.
    fn begin_sync_transaction(&self) -> Result<bool>;

    /// Publishes the next revision if anything changed and releases the lock.
    ///
    /// Returns false if the revision could not be written; the lock stays in
    /// place in that case.
    fn commit_sync_transaction(&self) -> Result<bool>;

    /// Releases the lock without publishing a revision.
    ///
    /// Returns false if no transaction was open.
    fn cancel_sync_transaction(&self) -> Result<bool>;

    /// Returns the UUID of every note currently in the store.
    fn all_note_uuids(&self) -> Result<HashSet<Uuid>>;

    /// Returns the newest change per note across all revisions after
    /// `revision`.
    fn note_updates_since(&self, revision: Revision) -> Result<HashMap<Uuid, NoteUpdate>>;

    /// Uploads notes and returns the UUIDs that made it.
    fn upload_notes(&self, notes: &[NoteRecord]) -> Result<Vec<Uuid>>;

    /// Deletes notes and returns the UUIDs that were recorded as deleted.
    fn delete_notes(&self, uuids: &[Uuid]) -> Result<Vec<Uuid>>;

    /// Returns the newest committed revision, or [`NO_REVISION`].
    fn latest_revision(&self) -> Result<Revision>;

    /// Returns the lock currently published in the store, if any.
    fn current_sync_lock(&self) -> Result<Option<LockClaim>>;

    /// Extends the open transaction's lock and returns the renewed claim.
    fn renew_sync_lock(&self) -> Result<LockClaim>;
}

/// State of the transaction this server instance holds.
#[derive(Debug)]
struct Transaction {
    claim: LockClaim,
    updated: BTreeSet<Uuid>,
    deleted: BTreeSet<Uuid>,
}

impl Transaction {
    fn new(claim: LockClaim) -> Self {
        Transaction { claim, updated: BTreeSet::new(), deleted: BTreeSet::new() }
    }

    fn has_changes(&self) -> bool {
        !self.updated.is_empty() || !self.deleted.is_empty()
    }
}

/// A sync store in a shared directory.
pub struct FileSystemSyncServer {
    root: PathBuf,
    client_id: String,
    lock_duration: Duration,
    clock: Arc<dyn Clock>,
    observation: Arc<Mutex<LockObservation>>,
    transaction: Mutex<Option<Transaction>>,
}

impl FileSystemSyncServer {
    /// Opens the store rooted at `root` on behalf of `client_id`.
    pub fn open(root: impl Into<PathBuf>, client_id: impl Into<String>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::StoreNotFound(root.display().to_string()));
        }
        Ok(FileSystemSyncServer {
            root,
            client_id: client_id.into(),
            lock_duration: DEFAULT_LOCK_DURATION,
            clock: Arc::new(SystemClock),
            observation: Arc::new(Mutex::new(LockObservation::new())),
            transaction: Mutex::new(None),
        })
    }

    /// Sets the duration declared in lock claims this server publishes.
    pub fn with_lock_duration(mut self, duration: Duration) -> Self {
        self.lock_duration = duration;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shares a lock observation with earlier server instances, so waiting
    /// on someone else's lock carries over between sync attempts.
    pub fn with_observation(mut self, observation: Arc<Mutex<LockObservation>>) -> Self {
        self.observation = observation;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    fn note_path(&self, uuid: &Uuid) -> PathBuf {
        self.root.join(note::file_name(uuid))
    }

    fn transaction(&self) -> MutexGuard<'_, Option<Transaction>> {
        self.transaction.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn observation(&self) -> MutexGuard<'_, LockObservation> {
        self.observation.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn require_transaction(&self) -> Result<()> {
        match self.transaction().as_ref() {
            Some(_) => Ok(()),
            None => Err(Error::NoTransaction),
        }
    }

    /// Reads the lock file and returns its fingerprint and declared duration.
    ///
    /// A lock that cannot be parsed is identified by its raw bytes and
    /// assumed to declare the default duration.
    fn peek_lock(&self) -> Result<Option<(String, Duration)>> {
        let bytes = match fs::read(self.lock_path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let raw = String::from_utf8_lossy(&bytes);
        match LockClaim::parse(&raw) {
            Ok(claim) => Ok(Some((claim.fingerprint(), claim.duration))),
            Err(e) => {
                tracing::warn!(error = %e, "sync lock is unreadable");
                Ok(Some((raw.into_owned(), DEFAULT_LOCK_DURATION)))
            }
        }
    }

    /// Publishes a new claim, failing if any lock appeared in the meantime.
    ///
    /// Returns false when another client won the race.
    fn publish_claim(&self, claim: &LockClaim) -> Result<bool> {
        let lock_path = self.lock_path();
        let json = claim.to_json()?;
        let staged = atomic::stage(&lock_path, json.as_bytes())?;

        let linked = fs::hard_link(&staged, &lock_path);
        let _ = fs::remove_file(&staged);
        let published = match linked {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => false,
            Err(e) => {
                tracing::debug!(error = %e, "hard links unavailable, using exclusive create");
                match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                    Ok(mut file) => {
                        file.write_all(json.as_bytes())?;
                        file.sync_all()?;
                        true
                    }
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => false,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        if published {
            make_shareable(&lock_path, false);
        }
        Ok(published)
    }

    /// Fails with [`Error::LockLost`] unless the store's lock is `claim`'s.
    fn verify_ownership(&self, claim: &LockClaim) -> Result<()> {
        let current = match fs::read_to_string(self.lock_path()) {
            Ok(content) => LockClaim::parse(&content).ok(),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        match current {
            Some(current) if current.transaction_id == claim.transaction_id => Ok(()),
            Some(current) => Err(Error::LockLost(format!("lock now held by {}", current.client_id))),
            None => Err(Error::LockLost("lock file is gone".to_string())),
        }
    }

    /// Removes the lock file if it still belongs to `claim`.
    fn release(&self, claim: &LockClaim) -> Result<()> {
        match self.verify_ownership(claim) {
            Ok(()) => remove_if_present(&self.lock_path()),
            Err(Error::LockLost(reason)) => {
                tracing::warn!(%reason, "not removing sync lock we no longer own");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn read_blob(&self, uuid: &Uuid) -> Result<String> {
        Ok(fs::read_to_string(self.note_path(uuid))?)
    }

    fn upload_one(&self, record: &NoteRecord) -> Result<()> {
        let path = self.note_path(&record.uuid);
        atomic::write(&path, record.to_content()?.as_bytes())?;
        make_shareable(&path, false);
        Ok(())
    }
}

impl SyncServer for FileSystemSyncServer {
    fn begin_sync_transaction(&self) -> Result<bool> {
        let mut transaction = self.transaction();
        if transaction.is_some() {
            return Err(Error::TransactionOpen);
        }

        if let Some((fingerprint, duration)) = self.peek_lock()? {
            let verdict = self.observation().observe(&fingerprint, duration, self.clock.now());
            if verdict == LockVerdict::Wait {
                tracing::debug!("sync store is locked by another client");
                return Ok(false);
            }

            // Someone may have replaced the stale lock since we peeked
            match self.peek_lock()? {
                Some((current, _)) if current != fingerprint => return Ok(false),
                _ => {}
            }
            tracing::warn!(?duration, "removing stale sync lock");
            remove_if_present(&self.lock_path())?;
        }
        self.observation().reset();

        let claim = LockClaim::new(&self.client_id, self.latest_revision()? + 1, self.lock_duration);
        if !self.publish_claim(&claim)? {
            tracing::debug!("lost race for sync lock");
            return Ok(false);
        }

        tracing::debug!(transaction = %claim.transaction_id, revision = claim.revision, "sync transaction started");
        *transaction = Some(Transaction::new(claim));
        Ok(true)
    }

    fn commit_sync_transaction(&self) -> Result<bool> {
        let mut guard = self.transaction();
        let transaction = guard.as_ref().ok_or(Error::NoTransaction)?;
        self.verify_ownership(&transaction.claim)?;

        if transaction.has_changes() {
            let revision = self.latest_revision()? + 1;
            let manifest = RevisionManifest {
                revision,
                updated: transaction.updated.iter().copied().collect(),
                deleted: transaction.deleted.iter().copied().collect(),
            };
            match manifest.write(&self.root) {
                Ok(path) => {
                    if let Some(bucket) = path.parent() {
                        make_shareable(bucket, true);
                    }
                    make_shareable(&path, false);
                }
                Err(e) => {
                    tracing::warn!(revision, error = %e, "failed to write revision manifest");
                    return Ok(false);
                }
            }
            tracing::info!(
                revision,
                updated = manifest.updated.len(),
                deleted = manifest.deleted.len(),
                "committed revision"
            );
        }

        if let Err(e) = remove_if_present(&self.lock_path()) {
            tracing::warn!(error = %e, "failed to remove sync lock after commit");
        }
        *guard = None;
        Ok(true)
    }

    fn cancel_sync_transaction(&self) -> Result<bool> {
        let Some(transaction) = self.transaction().take() else {
            return Ok(false);
        };
        self.release(&transaction.claim)?;
        tracing::debug!(transaction = %transaction.claim.transaction_id, "sync transaction cancelled");
        Ok(true)
    }

    fn all_note_uuids(&self) -> Result<HashSet<Uuid>> {
        let mut uuids = HashSet::new();
        for entry in fs::read_dir(&self.root)? {
            if let Some(uuid) = note::uuid_from_path(&entry?.path()) {
                uuids.insert(uuid);
            }
        }
        Ok(uuids)
    }

    fn note_updates_since(&self, revision: Revision) -> Result<HashMap<Uuid, NoteUpdate>> {
        let latest = self.latest_revision()?;
        let mut updates = HashMap::new();

        for rev in (revision.saturating_add(1).max(0)..=latest).rev() {
            let manifest = match RevisionManifest::load(&self.root, rev) {
                Ok(manifest) => manifest,
                Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(revision = rev, "revision manifest missing");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for uuid in manifest.deleted {
                updates.entry(uuid).or_insert_with(|| NoteUpdate::deleted(uuid, rev));
            }
            for uuid in manifest.updated {
                if updates.contains_key(&uuid) {
                    continue;
                }
                match self.read_blob(&uuid).and_then(|content| NoteUpdate::modified(uuid, content, rev)) {
                    Ok(update) => {
                        updates.insert(uuid, update);
                    }
                    Err(e) => tracing::warn!(%uuid, revision = rev, error = %e, "skipping unreadable note"),
                }
            }
        }

        Ok(updates)
    }

    fn upload_notes(&self, notes: &[NoteRecord]) -> Result<Vec<Uuid>> {
        self.require_transaction()?;

        let mut uploaded = Vec::with_capacity(notes.len());
        for record in notes {
            match self.upload_one(record) {
                Ok(()) => uploaded.push(record.uuid),
                Err(e) => tracing::warn!(uuid = %record.uuid, error = %e, "failed to upload note"),
            }
        }

        let mut transaction = self.transaction();
        let transaction = transaction.as_mut().ok_or(Error::NoTransaction)?;
        transaction.updated.extend(uploaded.iter().copied());
        Ok(uploaded)
    }

    fn delete_notes(&self, uuids: &[Uuid]) -> Result<Vec<Uuid>> {
        self.require_transaction()?;

        let mut deleted = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            match remove_if_present(&self.note_path(uuid)) {
                Ok(()) => deleted.push(*uuid),
                Err(e) => tracing::warn!(%uuid, error = %e, "failed to delete note"),
            }
        }

        let mut transaction = self.transaction();
        let transaction = transaction.as_mut().ok_or(Error::NoTransaction)?;
        for uuid in &deleted {
            transaction.updated.remove(uuid);
            transaction.deleted.insert(*uuid);
        }
        Ok(deleted)
    }

    fn latest_revision(&self) -> Result<Revision> {
        let mut buckets = numbered_entries(&self.root, |path| path.is_dir(), None)?;
        buckets.sort_unstable_by(|a, b| b.cmp(a));

        for bucket in buckets {
            let dir = self.root.join(bucket.to_string());
            let latest = numbered_entries(&dir, |path| path.is_file(), Some(MANIFEST_EXTENSION))?
                .into_iter()
                .filter(|rev| revision::bucket(*rev) == bucket)
                .max();
            if let Some(latest) = latest {
                return Ok(latest);
            }
        }
        Ok(NO_REVISION)
    }

    fn current_sync_lock(&self) -> Result<Option<LockClaim>> {
        match fs::read_to_string(self.lock_path()) {
            Ok(content) => Ok(Some(LockClaim::parse(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn renew_sync_lock(&self) -> Result<LockClaim> {
        let mut guard = self.transaction();
        let transaction = guard.as_mut().ok_or(Error::NoTransaction)?;
        self.verify_ownership(&transaction.claim)?;

        let renewed = transaction.claim.renewed();
        let lock_path = self.lock_path();
        let staged = atomic::stage(&lock_path, renewed.to_json()?.as_bytes())?;
        if let Err(e) = fs::rename(&staged, &lock_path) {
            let _ = fs::remove_file(&staged);
            return Err(e.into());
        }
        make_shareable(&lock_path, false);

        tracing::debug!(renew_count = renewed.renew_count, "renewed sync lock");
        transaction.claim = renewed.clone();
        Ok(renewed)
    }
}

/// Lists non-negative integers named by entries of `dir` that pass `keep`,
/// optionally requiring a file extension.
fn numbered_entries(dir: &Path, keep: impl Fn(&Path) -> bool, extension: Option<&str>) -> Result<Vec<Revision>> {
    let mut numbers = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !keep(&path) {
            continue;
        }
        let name = match extension {
            Some(ext) if path.extension().and_then(|e| e.to_str()) == Some(ext) => path.file_stem(),
            Some(_) => None,
            None => path.file_name(),
        };
        if let Some(n) = name.and_then(|n| n.to_str()).and_then(|n| n.parse::<Revision>().ok()) {
            if n >= 0 {
                numbers.push(n);
            }
        }
    }
    Ok(numbers)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Opens up permissions so every participant of a shared folder can
/// replace what this client wrote. Best effort.
#[cfg(unix)]
fn make_shareable(path: &Path, is_dir: bool) {
    use std::os::unix::fs::PermissionsExt;

    let mode = if is_dir { 0o777 } else { 0o666 };
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        tracing::debug!(path = %path.display(), error = %e, "could not relax permissions");
    }
}

#[cfg(not(unix))]
fn make_shareable(_path: &Path, _is_dir: bool) {}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
