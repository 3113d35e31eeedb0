// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Default client identity for the sync lock.
//!
//! The name only has to tell replicas apart in the lock file, so it is
//! derived from whatever the machine already knows about the user.

use std::process::Command;

/// Fallback when nothing better is known.
pub const FALLBACK_CLIENT_ID: &str = "quire";

/// Returns the default client id.
///
/// Resolution order: git `user.name`, then `$USER`/`$LOGNAME` unless it is a
/// system account, then [`FALLBACK_CLIENT_ID`].
pub fn default_client_id() -> String {
    git_user_name()
        .or_else(|| unix_username().filter(|name| !is_system_account(name)))
        .unwrap_or_else(|| FALLBACK_CLIENT_ID.to_string())
}

fn git_user_name() -> Option<String> {
    let output = Command::new("git").args(["config", "--get", "user.name"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn unix_username() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()
        .filter(|s| !s.is_empty())
}

fn is_system_account(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "root" | "system" | "administrator" | "admin" | "daemon" | "nobody"
    )
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
