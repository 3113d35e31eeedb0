// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn quire() -> Command {
    let mut cmd = cargo_bin_cmd!("quire");
    cmd.env("NO_COLOR", "1").env_remove("QUIRE_LOG");
    cmd
}

/// Helper to create a replica with no store configured
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    quire()
        .args(["init", "--client-id", "tester"])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create a replica syncing with `store`
pub fn init_replica(store: &Path, client_id: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    quire()
        .arg("init")
        .arg("--store")
        .arg(store)
        .args(["--client-id", client_id])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Runs `quire <args>` inside `dir`.
pub fn quire_in(dir: &TempDir, args: &[&str]) -> assert_cmd::assert::Assert {
    quire().args(args).current_dir(dir.path()).assert()
}

/// Runs `quire sync` with stdin closed, so conflicts follow `--on-conflict`.
pub fn sync_in(dir: &TempDir, extra: &[&str]) -> assert_cmd::assert::Assert {
    quire()
        .arg("sync")
        .args(extra)
        .current_dir(dir.path())
        .write_stdin("")
        .assert()
}

pub fn create_note(dir: &TempDir, title: &str, text: &str) {
    quire_in(dir, &["new", title, "-t", text]).success();
}

/// Titles printed by `quire list`, in order.
pub fn titles(dir: &TempDir) -> Vec<String> {
    let output = quire().arg("list").current_dir(dir.path()).output().unwrap();
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.split_once("  ").map(|(_, title)| title.to_string()))
        .collect()
}
