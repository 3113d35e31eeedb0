// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use quire_core::{NoteCollection, NoteRecord};

use super::{open_replica, short_uuid};
use crate::cli::OutputFormat;
use crate::colors;
use crate::error::Result;

pub fn run(output: OutputFormat) -> Result<()> {
    let replica = open_replica()?;
    let notes = sorted(replica.notes.notes());

    match output {
        OutputFormat::Text => {
            if notes.is_empty() {
                println!("No notes.");
            }
            for note in &notes {
                println!("{}  {}", colors::context(&short_uuid(&note.uuid)), note.title);
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = notes
                .iter()
                .map(|n| {
                    serde_json::json!({
                        "uuid": n.uuid,
                        "title": n.title,
                        "change_date": n.change_date,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

/// Orders notes by title, ignoring case.
pub(crate) fn sorted(mut notes: Vec<NoteRecord>) -> Vec<NoteRecord> {
    notes.sort_by_cached_key(|n| (n.title.to_lowercase(), n.uuid));
    notes
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
