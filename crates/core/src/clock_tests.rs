// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[test]
fn manual_clock_only_moves_when_advanced() {
    let start = Utc::now();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.now(), start + TimeDelta::seconds(90));
}

#[test]
fn manual_clock_set() {
    let clock = ManualClock::default();
    let target = DateTime::UNIX_EPOCH + TimeDelta::days(3);
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[parameterized(
    exactly = { 60, 60, true },
    longer = { 61, 60, true },
    shorter = { 59, 60, false },
    backwards = { -10, 60, false },
)]
fn elapsed_threshold(offset_secs: i64, duration_secs: u64, expected: bool) {
    let from = Utc::now();
    let to = from + TimeDelta::seconds(offset_secs);
    assert_eq!(elapsed_at_least(from, to, Duration::from_secs(duration_secs)), expected);
}
