// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What `quire sync` does with a title conflict when nobody is at the
/// terminal to ask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    /// Abort the sync and leave everything as it was
    #[default]
    Cancel,
    /// Delete the local note that holds the title
    Delete,
    /// Rename the local note, leaving links to it untouched
    Rename,
    /// Rename the local note and rewrite links to it
    RenameUpdate,
}

#[derive(Parser)]
#[command(name = "quire")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plain-text notes synchronized through a shared folder")]
#[command(
    long_about = "Plain-text notes synchronized through a shared folder.\n\n\
    Each replica keeps its notes under .quire/notes and exchanges changes with \
    other replicas through a store directory that all of them can reach."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
pub struct Cli {
    /// Run as if quire was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Log sync progress to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a replica in the current directory
    #[command(after_help = colors::examples("\
Examples:
  quire init                               Notes only, sync configured later
  quire init --store /mnt/shared/notes     Notes synced through a shared folder
  quire init --client-id laptop            Name this replica in the sync lock"))]
    Init {
        /// Shared folder to sync with
        #[arg(long, value_name = "path")]
        store: Option<String>,

        /// Name this replica writes into the sync lock
        #[arg(long, value_parser = non_empty_string)]
        client_id: Option<String>,
    },

    /// Create a note
    #[command(after_help = colors::examples("\
Examples:
  quire new \"Groceries\"                    Empty note
  quire new \"Groceries\" -t \"eggs, milk\"    Note with text
  quire new \"Plan\" -t \"see [[Groceries]]\"  Note linking to another note"))]
    New {
        /// Title of the new note
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Text of the new note
        #[arg(long, short, default_value = "")]
        text: String,
    },

    /// Replace a note's text
    Edit {
        /// Note title, UUID, or UUID prefix
        note: String,

        /// New text
        #[arg(long, short)]
        text: String,
    },

    /// Rename a note
    #[command(after_help = colors::examples("\
Examples:
  quire rename Groceries Shopping                   Rename only
  quire rename Groceries Shopping --update-links    Also rewrite [[Groceries]] links"))]
    Rename {
        /// Note title, UUID, or UUID prefix
        note: String,

        /// New title
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Rewrite links to the note in other notes
        #[arg(long)]
        update_links: bool,
    },

    /// Delete a note
    Delete {
        /// Note title, UUID, or UUID prefix
        note: String,
    },

    /// List notes
    List {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show a note
    Show {
        /// Note title, UUID, or UUID prefix
        note: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Synchronize with the shared store
    #[command(after_help = colors::examples("\
Examples:
  quire sync                              Ask about title conflicts (cancel if not a terminal)
  quire sync --on-conflict rename         Rename conflicting local notes automatically
  quire sync --on-conflict delete         Replace conflicting local notes"))]
    Sync {
        /// Answer to title conflicts when stdin is not a terminal
        #[arg(long, value_enum, default_value = "cancel")]
        on_conflict: ConflictPolicy,
    },

    /// Show sync status
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Point this replica at a shared folder
    ///
    /// Switching stores forgets what was synchronized with the old one, so
    /// the next sync starts from scratch.
    Store {
        /// Shared folder to sync with
        path: String,
    },

    /// Print the effective configuration
    Show,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
