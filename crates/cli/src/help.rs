// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    Styles::styled()
        .header(fg(colors::codes::HEADER))
        .usage(fg(colors::codes::HEADER))
        .literal(fg(colors::codes::LITERAL))
        .placeholder(fg(colors::codes::CONTEXT))
        .valid(fg(colors::codes::CONTEXT))
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    let line = |name: &str, about: &str| format!("  {}{}", colors::literal(&format!("{name:<12}")), about);
    [
        colors::header("Notes:"),
        line("new", "Create a note"),
        line("edit", "Replace a note's text"),
        line("rename", "Rename a note"),
        line("delete", "Delete a note"),
        line("list", "List notes"),
        line("show", "Show a note"),
        String::new(),
        colors::header("Sync:"),
        line("init", "Create a replica in this directory"),
        line("sync", "Synchronize with the shared store"),
        line("status", "Show sync status"),
        line("config", "Manage configuration"),
        line("completion", "Generate shell completions"),
    ]
    .join("\n")
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  quire init --store /mnt/shared/notes    Create a replica backed by a shared folder
  quire new \"Groceries\" -t \"eggs\"         Write a note
  quire sync                              Exchange changes with other replicas",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
