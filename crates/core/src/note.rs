// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Note records and their on-disk serialization.
//!
//! A note file is a small JSON document named `<uuid>.note`. The same bytes
//! are stored in the local replica and in the shared sync store, so the file
//! never carries replica-specific bookkeeping.
//!
//! Internal links are written `[[Other Note Title]]` inside the note text.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// File extension for serialized notes.
pub const NOTE_EXTENSION: &str = "note";

/// A note as seen by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Stable identity shared by every replica.
    pub uuid: Uuid,
    pub title: String,
    pub text: String,
    pub create_date: DateTime<Utc>,
    /// Last local modification; compared against the last sync date.
    pub change_date: DateTime<Utc>,
}

/// Serialized form of a note.
#[derive(Debug, Serialize, Deserialize)]
struct NoteDocument {
    title: String,
    #[serde(default)]
    text: String,
    create_date: DateTime<Utc>,
    change_date: DateTime<Utc>,
}

impl NoteRecord {
    /// Creates a brand-new note with a fresh UUID.
    pub fn new(title: impl Into<String>, text: impl Into<String>, now: DateTime<Utc>) -> Self {
        NoteRecord {
            uuid: Uuid::new_v4(),
            title: title.into(),
            text: text.into(),
            create_date: now,
            change_date: now,
        }
    }

    /// Parses a note from its serialized content.
    pub fn from_content(uuid: Uuid, content: &str) -> Result<Self> {
        let doc: NoteDocument = serde_json::from_str(content)?;
        let title = validate_title(&doc.title)?;
        Ok(NoteRecord {
            uuid,
            title,
            text: doc.text,
            create_date: doc.create_date,
            change_date: doc.change_date,
        })
    }

    /// Serializes the note for storage or upload.
    pub fn to_content(&self) -> Result<String> {
        let doc = NoteDocument {
            title: self.title.clone(),
            text: self.text.clone(),
            create_date: self.create_date,
            change_date: self.change_date,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Returns the file name used for this note in any note directory.
    pub fn file_name(&self) -> String {
        file_name(&self.uuid)
    }

    /// Returns true if title and text match the other note.
    pub fn same_content(&self, other: &NoteRecord) -> bool {
        self.title == other.title && self.text == other.text
    }

    /// Returns true if the note text links to `title`.
    pub fn links_to(&self, title: &str) -> bool {
        self.text.contains(&link(title))
    }
}

/// Returns the file name of the note with the given UUID.
pub fn file_name(uuid: &Uuid) -> String {
    format!("{uuid}.{NOTE_EXTENSION}")
}

/// Extracts the note UUID from a `<uuid>.note` path.
///
/// Returns `None` for anything that is not a note file.
pub fn uuid_from_path(path: &Path) -> Option<Uuid> {
    if path.extension().and_then(|e| e.to_str()) != Some(NOTE_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    Uuid::parse_str(stem).ok()
}

/// Reads only the title out of serialized note content.
pub fn title_from_content(content: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct TitleOnly {
        title: String,
    }
    let doc: TitleOnly = serde_json::from_str(content)?;
    validate_title(&doc.title)
}

/// Trims a title and rejects empty ones.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidNote("title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Rewrites every `[[old]]` link in `text` to `[[new]]`.
///
/// Returns `None` when the text has no such link.
pub fn rewrite_links(text: &str, old: &str, new: &str) -> Option<String> {
    let from = link(old);
    if !text.contains(&from) {
        return None;
    }
    Some(text.replace(&from, &link(new)))
}

fn link(title: &str) -> String {
    format!("[[{title}]]")
}

#[cfg(test)]
#[path = "note_tests.rs"]
mod tests;
