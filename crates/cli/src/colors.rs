// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help and sync output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use is_terminal::IsTerminal;

/// ANSI 256-color codes used across the CLI.
pub mod codes {
    /// Section headers
    pub const HEADER: u8 = 74;
    /// Commands and note titles
    pub const LITERAL: u8 = 250;
    /// Placeholders and secondary detail
    pub const CONTEXT: u8 = 245;
}

const RESET: &str = "\x1b[0m";

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Colorize an examples block for `after_help`.
///
/// Lines ending in `:` become headers. Other lines are split at the first run
/// of two or more spaces into a command (literal) and a description.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let mut out = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            out.push(format!("{indent}{}", header(trimmed)));
        } else if let Some(split) = description_start(trimmed) {
            let (cmd, desc) = trimmed.split_at(split);
            out.push(format!("{indent}{}{desc}", literal(cmd)));
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

/// Byte offset where a two-space gap ends the command part of a line.
pub(crate) fn description_start(line: &str) -> Option<usize> {
    let gap = line.find("  ")?;
    if line[gap..].trim().is_empty() {
        None
    } else {
        Some(gap)
    }
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
