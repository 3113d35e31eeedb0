// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    note_not_found = { Error::NoteNotFound("Groceries".into()), "Groceries" },
    title_in_use = { Error::TitleInUse("Groceries".into()), "hint" },
    store_not_found = { Error::StoreNotFound("/mnt/notes".into()), "mounted" },
    revision_exists = { Error::RevisionExists(42), "42" },
    no_transaction = { Error::NoTransaction, "transaction" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn error_from_uuid() {
    let uuid_err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
    let err: Error = uuid_err.into();
    assert!(matches!(err, Error::Uuid(_)));
}
