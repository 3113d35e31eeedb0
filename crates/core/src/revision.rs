// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Revision-indexed change log.
//!
//! Every committed sync transaction produces one manifest file listing the
//! notes it updated and the notes it deleted:
//!
//! ```text
//! <store>/<revision / 100>/<revision>.rev
//!
//! U
//! 3f1c2a9e-8a2b-4c55-9d61-0c7f3b2a1e44
//! D
//! 9b0e6d1f-2c1a-4e3b-8f7d-5a6b4c3d2e1f
//! ```
//!
//! Both sections are optional. A manifest is written exactly once and never
//! modified afterward.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::note::title_from_content;

/// A server-assigned revision number.
pub type Revision = i64;

/// Sentinel for "no revision": an empty store or a never-synced note.
pub const NO_REVISION: Revision = -1;

/// File extension for revision manifests.
pub const MANIFEST_EXTENSION: &str = "rev";

/// Number of revisions that share one parent directory.
const BUCKET_SIZE: Revision = 100;

const UPDATED_SECTION: &str = "U";
const DELETED_SECTION: &str = "D";

/// Returns the parent bucket of a revision.
pub fn bucket(revision: Revision) -> Revision {
    revision / BUCKET_SIZE
}

/// Returns the manifest path for `revision` under the store root.
pub fn manifest_path(root: &Path, revision: Revision) -> PathBuf {
    root.join(bucket(revision).to_string()).join(format!("{revision}.{MANIFEST_EXTENSION}"))
}

/// The notes touched by one committed revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionManifest {
    pub revision: Revision,
    pub updated: Vec<Uuid>,
    pub deleted: Vec<Uuid>,
}

impl RevisionManifest {
    /// Creates an empty manifest for `revision`.
    pub fn new(revision: Revision) -> Self {
        RevisionManifest { revision, updated: Vec::new(), deleted: Vec::new() }
    }

    /// Returns true if the manifest records no changes.
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Parses manifest text.
    ///
    /// Blank lines and lines before the first section marker are ignored.
    pub fn parse(revision: Revision, text: &str) -> Result<Self> {
        let mut manifest = RevisionManifest::new(revision);
        let mut section = None;

        for line in text.lines() {
            let line = line.trim();
            match line {
                "" => continue,
                UPDATED_SECTION | DELETED_SECTION => section = Some(line),
                _ => {
                    let list = match section {
                        Some(UPDATED_SECTION) => &mut manifest.updated,
                        Some(_) => &mut manifest.deleted,
                        None => continue,
                    };
                    let uuid = Uuid::parse_str(line).map_err(|e| {
                        Error::CorruptedData(format!("revision {revision}: bad note id '{line}': {e}"))
                    })?;
                    list.push(uuid);
                }
            }
        }

        Ok(manifest)
    }

    /// Renders the manifest text, updated section first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.updated.is_empty() {
            out.push_str(UPDATED_SECTION);
            out.push('\n');
            for uuid in &self.updated {
                out.push_str(&uuid.to_string());
                out.push('\n');
            }
        }
        if !self.deleted.is_empty() {
            out.push_str(DELETED_SECTION);
            out.push('\n');
            for uuid in &self.deleted {
                out.push_str(&uuid.to_string());
                out.push('\n');
            }
        }
        out
    }

    /// Loads the manifest for `revision` from the store.
    pub fn load(root: &Path, revision: Revision) -> Result<Self> {
        let text = fs::read_to_string(manifest_path(root, revision))?;
        Self::parse(revision, &text)
    }

    /// Writes the manifest into the store.
    ///
    /// Fails with [`Error::RevisionExists`] if the revision was already
    /// published; manifests are never overwritten.
    pub fn write(&self, root: &Path) -> Result<PathBuf> {
        let path = manifest_path(root, self.revision);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::RevisionExists(self.revision));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(self.render().as_bytes())?;
        file.sync_all()?;

        Ok(path)
    }
}

/// One note's change as seen by a client catching up on the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpdate {
    pub uuid: Uuid,
    /// Title of the incoming note; empty for deletions.
    pub title: String,
    /// Serialized note, or `None` for a deletion tombstone.
    pub content: Option<String>,
    /// Revision that produced this update.
    pub revision: Revision,
}

impl NoteUpdate {
    /// Creates a create/modify update, reading the title from `content`.
    pub fn modified(uuid: Uuid, content: String, revision: Revision) -> Result<Self> {
        let title = title_from_content(&content)?;
        Ok(NoteUpdate { uuid, title, content: Some(content), revision })
    }

    /// Creates a deletion tombstone.
    pub fn deleted(uuid: Uuid, revision: Revision) -> Self {
        NoteUpdate { uuid, title: String::new(), content: None, revision }
    }

    /// Returns true if this update deletes the note.
    pub fn is_tombstone(&self) -> bool {
        self.content.is_none()
    }
}

#[cfg(test)]
#[path = "revision_tests.rs"]
mod tests;
