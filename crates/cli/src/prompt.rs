// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal side of a sync session: progress output and conflict prompts.

use std::io::{self, BufRead, Write};

use is_terminal::IsTerminal;
use quire_core::NoteCollection;
use quire_sync::{ConflictRequest, ConflictResolution, NoteSyncType, SyncObserver, SyncState};

use crate::cli::ConflictPolicy;
use crate::colors;

impl ConflictPolicy {
    /// The answer this policy gives for a conflict.
    pub fn resolution(self, suggested_title: &str) -> ConflictResolution {
        match self {
            ConflictPolicy::Cancel => ConflictResolution::Cancel,
            ConflictPolicy::Delete => ConflictResolution::DeleteExisting,
            ConflictPolicy::Rename => ConflictResolution::RenameExistingNoUpdate(suggested_title.to_string()),
            ConflictPolicy::RenameUpdate => {
                ConflictResolution::RenameExistingAndUpdate(suggested_title.to_string())
            }
        }
    }
}

/// Prints session progress and answers title conflicts.
///
/// Conflicts are asked about when stdin is a terminal; otherwise the
/// configured policy answers them.
pub struct TerminalObserver {
    policy: ConflictPolicy,
    interactive: bool,
    synchronized: usize,
    failed: usize,
}

impl TerminalObserver {
    pub fn new(policy: ConflictPolicy) -> Self {
        TerminalObserver { policy, interactive: io::stdin().is_terminal(), synchronized: 0, failed: 0 }
    }

    /// Number of per-note outcomes reported so far.
    pub fn synchronized(&self) -> usize {
        self.synchronized
    }

    /// Number of notes that could not be transferred.
    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl<C: NoteCollection> SyncObserver<C> for TerminalObserver {
    fn state_changed(&mut self, state: SyncState) {
        tracing::info!(?state, "{}", state.description());
    }

    fn note_synchronized(&mut self, title: &str, kind: NoteSyncType) {
        if kind.is_failure() {
            self.failed += 1;
            eprintln!("  {:<17} {}", kind.description(), title);
            return;
        }
        self.synchronized += 1;
        println!("  {} {}", colors::context(&format!("{:<17}", kind.description())), title);
    }

    fn conflict_detected(&mut self, _notes: &C, request: ConflictRequest) {
        let resolution = if self.interactive {
            let stdin = io::stdin();
            ask(
                &request.local().title,
                request.suggested_title(),
                &mut stdin.lock(),
                &mut io::stderr(),
            )
        } else {
            let resolution = self.policy.resolution(request.suggested_title());
            eprintln!(
                "Conflict: the store has a different note titled \"{}\"; {}",
                request.local().title,
                describe(&resolution)
            );
            resolution
        };
        request.respond(resolution);
    }
}

/// Asks until a valid answer is given. End of input cancels.
pub(crate) fn ask(
    title: &str,
    suggested: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> ConflictResolution {
    let _ = writeln!(
        out,
        "A different note titled \"{title}\" arrived from the store.\n\
         What should happen to your local \"{title}\"?\n  \
         [d] delete it\n  \
         [r] rename it to \"{suggested}\"\n  \
         [u] rename it to \"{suggested}\" and update links to it\n  \
         [c] cancel the sync"
    );
    loop {
        let _ = write!(out, "Choice [d/r/u/c]: ");
        let _ = out.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return ConflictResolution::Cancel,
            Ok(_) => {}
        }
        if let Some(resolution) = parse_choice(&line, suggested) {
            return resolution;
        }
    }
}

fn describe(resolution: &ConflictResolution) -> String {
    match resolution {
        ConflictResolution::Cancel => "cancelling the sync".to_string(),
        ConflictResolution::DeleteExisting => "deleting the local note".to_string(),
        ConflictResolution::RenameExistingNoUpdate(title) => format!("renaming the local note to \"{title}\""),
        ConflictResolution::RenameExistingAndUpdate(title) => {
            format!("renaming the local note to \"{title}\" and updating links")
        }
    }
}

pub(crate) fn parse_choice(input: &str, suggested: &str) -> Option<ConflictResolution> {
    match input.trim().to_lowercase().as_str() {
        "d" | "delete" => Some(ConflictResolution::DeleteExisting),
        "r" | "rename" => Some(ConflictResolution::RenameExistingNoUpdate(suggested.to_string())),
        "u" | "update" => Some(ConflictResolution::RenameExistingAndUpdate(suggested.to_string())),
        "c" | "cancel" => Some(ConflictResolution::Cancel),
        _ => None,
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
