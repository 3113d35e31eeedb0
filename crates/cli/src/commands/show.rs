// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use quire_core::NoteRecord;

use super::open_replica;
use crate::cli::OutputFormat;
use crate::colors;
use crate::error::Result;

pub fn run(reference: &str, output: OutputFormat) -> Result<()> {
    let replica = open_replica()?;
    let note = replica.notes.resolve(reference)?;
    match output {
        OutputFormat::Text => println!("{}", format_note(note)),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "uuid": note.uuid,
                "title": note.title,
                "text": note.text,
                "create_date": note.create_date,
                "change_date": note.change_date,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

pub(crate) fn format_note(note: &NoteRecord) -> String {
    let mut out = format!(
        "{}\n{} {}\n{} {}",
        colors::header(&note.title),
        colors::context("uuid:"),
        note.uuid,
        colors::context("changed:"),
        note.change_date.format("%Y-%m-%d %H:%M"),
    );
    if !note.text.is_empty() {
        out.push_str("\n\n");
        out.push_str(&note.text);
    }
    out
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
