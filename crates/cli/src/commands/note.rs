// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Note editing commands: new, edit, rename, delete.

use quire_core::{NoteCollection, NoteRecord, NO_REVISION};

use super::{open_replica, short_uuid, Replica};
use crate::error::Result;

pub fn run_new(title: &str, text: &str) -> Result<()> {
    let mut replica = open_replica()?;
    let note = new_impl(&mut replica, title, text)?;
    println!("Created {} ({})", note.title, short_uuid(&note.uuid));
    Ok(())
}

pub(crate) fn new_impl(replica: &mut Replica, title: &str, text: &str) -> Result<NoteRecord> {
    Ok(replica.notes.create(title, text)?)
}

pub fn run_edit(reference: &str, text: &str) -> Result<()> {
    let mut replica = open_replica()?;
    let note = edit_impl(&mut replica, reference, text)?;
    println!("Updated {}", note.title);
    Ok(())
}

pub(crate) fn edit_impl(replica: &mut Replica, reference: &str, text: &str) -> Result<NoteRecord> {
    let uuid = replica.notes.resolve(reference)?.uuid;
    Ok(replica.notes.edit_text(&uuid, text)?)
}

pub fn run_rename(reference: &str, title: &str, update_links: bool) -> Result<()> {
    let mut replica = open_replica()?;
    let old_title = rename_impl(&mut replica, reference, title, update_links)?;
    println!("Renamed {} to {}", old_title, title.trim());
    Ok(())
}

/// Renames a note and returns its previous title.
pub(crate) fn rename_impl(
    replica: &mut Replica,
    reference: &str,
    title: &str,
    update_links: bool,
) -> Result<String> {
    let note = replica.notes.resolve(reference)?;
    let (uuid, old_title) = (note.uuid, note.title.clone());
    replica.notes.rename(&uuid, title, update_links)?;
    Ok(old_title)
}

pub fn run_delete(reference: &str) -> Result<()> {
    let mut replica = open_replica()?;
    let note = delete_impl(&mut replica, reference)?;
    println!("Deleted {}", note.title);
    Ok(())
}

/// Deletes a note. Notes the store already knows about are remembered by
/// title so the next sync can report their removal.
pub(crate) fn delete_impl(replica: &mut Replica, reference: &str) -> Result<NoteRecord> {
    let uuid = replica.notes.resolve(reference)?.uuid;
    let mut client = replica.client()?;
    let note = replica.notes.delete(&uuid)?;
    if client.revision(&uuid) != NO_REVISION {
        client.record_deleted_note(uuid, note.title.clone())?;
    }
    Ok(note)
}

#[cfg(test)]
#[path = "note_tests.rs"]
mod tests;
