// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    closed = { Error::CollectionClosed, "no longer" },
    runtime = { Error::NoRuntime, "tokio runtime" },
    not_configured = { Error::NotConfigured, "hint" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn core_errors_display_unchanged() {
    let err: Error = quire_core::Error::NoTransaction.into();
    assert!(matches!(err, Error::Core(quire_core::Error::NoTransaction)));
    assert_eq!(err.to_string(), quire_core::Error::NoTransaction.to_string());
}
