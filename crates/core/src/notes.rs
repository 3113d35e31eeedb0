// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The local note collection.
//!
//! [`NoteCollection`] is what the sync engine needs from a replica's notes.
//! [`NoteStore`] implements it over a directory of `<uuid>.note` files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::atomic;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::note::{self, rewrite_links, validate_title, NoteRecord};

/// Operations the sync engine performs on a replica's notes.
pub trait NoteCollection {
    /// Returns every note, ordered by UUID.
    fn notes(&self) -> Vec<NoteRecord>;

    fn find_by_uuid(&self, uuid: &Uuid) -> Option<&NoteRecord>;

    /// Looks up a note by title, ignoring case.
    fn find_by_title(&self, title: &str) -> Option<&NoteRecord>;

    /// Creates a new note with a fresh UUID.
    fn create(&mut self, title: &str, text: &str) -> Result<NoteRecord>;

    /// Creates a note from serialized content received from the store.
    fn create_from_content(&mut self, uuid: Uuid, content: &str) -> Result<NoteRecord>;

    /// Replaces an existing note with serialized content from the store.
    fn update_from_content(&mut self, uuid: &Uuid, content: &str) -> Result<NoteRecord>;

    /// Deletes a note and returns what was removed.
    fn delete(&mut self, uuid: &Uuid) -> Result<NoteRecord>;

    /// Renames a note, optionally rewriting `[[old title]]` links elsewhere.
    fn rename(&mut self, uuid: &Uuid, title: &str, update_references: bool) -> Result<()>;
}

/// A directory of note files held in memory.
pub struct NoteStore {
    dir: PathBuf,
    notes: BTreeMap<Uuid, NoteRecord>,
    clock: Arc<dyn Clock>,
}

impl NoteStore {
    /// Opens (creating if needed) the note directory and loads every note.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn open(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let mut notes = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(uuid) = note::uuid_from_path(&path) else {
                continue;
            };
            match fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|content| NoteRecord::from_content(uuid, &content))
            {
                Ok(record) => {
                    notes.insert(uuid, record);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable note"),
            }
        }

        Ok(NoteStore { dir, notes, clock })
    }

    /// Returns the note directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Replaces a note's text and bumps its change date.
    pub fn edit_text(&mut self, uuid: &Uuid, text: &str) -> Result<NoteRecord> {
        let now = self.clock.now();
        let mut record = self.get(uuid)?.clone();
        record.text = text.to_string();
        record.change_date = now;
        self.save(&record)?;
        Ok(record)
    }

    /// Resolves a user-supplied reference: a UUID, a UUID prefix, or a title.
    pub fn resolve(&self, reference: &str) -> Result<&NoteRecord> {
        if let Ok(uuid) = Uuid::parse_str(reference) {
            if let Some(record) = self.notes.get(&uuid) {
                return Ok(record);
            }
        }
        if let Some(record) = self.find_by_title(reference) {
            return Ok(record);
        }

        let prefix = reference.to_ascii_lowercase();
        let mut matches = self.notes.values().filter(|n| n.uuid.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(record), None) if !prefix.is_empty() => Ok(record),
            _ => Err(Error::NoteNotFound(reference.to_string())),
        }
    }

    fn get(&self, uuid: &Uuid) -> Result<&NoteRecord> {
        self.notes.get(uuid).ok_or_else(|| Error::NoteNotFound(uuid.to_string()))
    }

    fn path_of(&self, uuid: &Uuid) -> PathBuf {
        self.dir.join(note::file_name(uuid))
    }

    fn ensure_title_free(&self, title: &str, except: Option<&Uuid>) -> Result<()> {
        match self.find_by_title(title) {
            Some(existing) if Some(&existing.uuid) != except => Err(Error::TitleInUse(title.to_string())),
            _ => Ok(()),
        }
    }

    fn save(&mut self, record: &NoteRecord) -> Result<()> {
        atomic::write(&self.path_of(&record.uuid), record.to_content()?.as_bytes())?;
        self.notes.insert(record.uuid, record.clone());
        Ok(())
    }
}

impl NoteCollection for NoteStore {
    fn notes(&self) -> Vec<NoteRecord> {
        self.notes.values().cloned().collect()
    }

    fn find_by_uuid(&self, uuid: &Uuid) -> Option<&NoteRecord> {
        self.notes.get(uuid)
    }

    fn find_by_title(&self, title: &str) -> Option<&NoteRecord> {
        let wanted = title.trim().to_lowercase();
        self.notes.values().find(|n| n.title.to_lowercase() == wanted)
    }

    fn create(&mut self, title: &str, text: &str) -> Result<NoteRecord> {
        let title = validate_title(title)?;
        self.ensure_title_free(&title, None)?;

        let record = NoteRecord::new(title, text, self.clock.now());
        self.save(&record)?;
        tracing::debug!(uuid = %record.uuid, title = %record.title, "created note");
        Ok(record)
    }

    fn create_from_content(&mut self, uuid: Uuid, content: &str) -> Result<NoteRecord> {
        if self.notes.contains_key(&uuid) {
            return Err(Error::InvalidNote(format!("note {uuid} already exists")));
        }
        let record = NoteRecord::from_content(uuid, content)?;
        self.save(&record)?;
        Ok(record)
    }

    fn update_from_content(&mut self, uuid: &Uuid, content: &str) -> Result<NoteRecord> {
        self.get(uuid)?;
        let record = NoteRecord::from_content(*uuid, content)?;
        self.save(&record)?;
        Ok(record)
    }

    fn delete(&mut self, uuid: &Uuid) -> Result<NoteRecord> {
        self.get(uuid)?;
        match fs::remove_file(self.path_of(uuid)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.notes.remove(uuid).ok_or_else(|| Error::NoteNotFound(uuid.to_string()))
    }

    fn rename(&mut self, uuid: &Uuid, title: &str, update_references: bool) -> Result<()> {
        let title = validate_title(title)?;
        self.ensure_title_free(&title, Some(uuid))?;

        let now = self.clock.now();
        let mut record = self.get(uuid)?.clone();
        let old_title = std::mem::replace(&mut record.title, title.clone());
        record.change_date = now;
        self.save(&record)?;

        if !update_references || old_title == title {
            return Ok(());
        }

        let linking: Vec<NoteRecord> = self
            .notes
            .values()
            .filter(|n| n.uuid != *uuid)
            .filter_map(|n| {
                rewrite_links(&n.text, &old_title, &title).map(|text| NoteRecord {
                    text,
                    change_date: now,
                    ..n.clone()
                })
            })
            .collect();
        for note in &linking {
            self.save(note)?;
        }
        tracing::debug!(from = %old_title, to = %title, updated = linking.len(), "renamed note");
        Ok(())
    }
}

#[cfg(test)]
#[path = "notes_tests.rs"]
mod tests;
