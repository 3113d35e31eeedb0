// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::io::Cursor;
use yare::parameterized;

#[parameterized(
    cancel = { ConflictPolicy::Cancel, ConflictResolution::Cancel },
    delete = { ConflictPolicy::Delete, ConflictResolution::DeleteExisting },
    rename = { ConflictPolicy::Rename, ConflictResolution::RenameExistingNoUpdate("Notes (old)".into()) },
    rename_update = { ConflictPolicy::RenameUpdate, ConflictResolution::RenameExistingAndUpdate("Notes (old)".into()) },
)]
fn policy_answers(policy: ConflictPolicy, expected: ConflictResolution) {
    assert_eq!(policy.resolution("Notes (old)"), expected);
}

#[parameterized(
    d = { "d\n", Some(ConflictResolution::DeleteExisting) },
    delete_word = { "Delete\n", Some(ConflictResolution::DeleteExisting) },
    r = { " r ", Some(ConflictResolution::RenameExistingNoUpdate("X (old)".into())) },
    u = { "u", Some(ConflictResolution::RenameExistingAndUpdate("X (old)".into())) },
    c = { "c\n", Some(ConflictResolution::Cancel) },
    blank = { "\n", None },
    nonsense = { "maybe", None },
)]
fn parses_choices(input: &str, expected: Option<ConflictResolution>) {
    assert_eq!(parse_choice(input, "X (old)"), expected);
}

#[test]
fn ask_repeats_until_valid() {
    let mut input = Cursor::new("what\n\nu\n");
    let mut out = Vec::new();

    let answer = ask("X", "X (old)", &mut input, &mut out);
    assert_eq!(answer, ConflictResolution::RenameExistingAndUpdate("X (old)".into()));

    let shown = String::from_utf8(out).unwrap();
    assert_eq!(shown.matches("Choice [d/r/u/c]: ").count(), 3);
    assert!(shown.contains("rename it to \"X (old)\""));
}

#[test]
fn ask_cancels_at_end_of_input() {
    let mut input = Cursor::new("");
    let mut out = Vec::new();
    assert_eq!(ask("X", "X (old)", &mut input, &mut out), ConflictResolution::Cancel);
}
