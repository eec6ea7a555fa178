// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::MockClock;
use yare::parameterized;

#[test]
fn stamp_ordering() {
    assert!(Stamp::new(200, 0) > Stamp::new(100, 5));
    assert!(Stamp::new(100, 2) > Stamp::new(100, 1));
    assert_eq!(Stamp::new(100, 1), Stamp::new(100, 1));
}

#[test]
fn stamp_display_round_trips() {
    let stamp = Stamp::new(1_700_000_000_000, 3);
    assert_eq!(stamp.to_string(), "1700000000000-3");
    assert_eq!(stamp.to_string().parse::<Stamp>().unwrap(), stamp);
}

#[parameterized(
    empty = { "" },
    missing_counter = { "1000" },
    bad_wall = { "abc-0" },
    bad_counter = { "1000-x" },
    negative = { "-1-0" },
)]
fn stamp_parse_rejects(input: &str) {
    assert!(matches!(
        input.parse::<Stamp>(),
        Err(Error::InvalidRequestId(_))
    ));
}

#[test]
fn stamp_created_at_uses_wall_time() {
    let stamp = Stamp::new(1_000, 7);
    assert_eq!(stamp.created_at().timestamp_millis(), 1_000);
}

#[test]
fn clock_advances_with_wall_time() {
    let source = MockClock::new(1_000);
    let clock = LogClock::with_clock(source.clone());

    assert_eq!(clock.now(), Stamp::new(1_000, 0));
    source.set(2_000);
    assert_eq!(clock.now(), Stamp::new(2_000, 0));
}

#[test]
fn clock_increments_counter_within_same_millisecond() {
    let clock = LogClock::with_clock(MockClock::new(1_000));

    let a = clock.now();
    let b = clock.now();
    let c = clock.now();

    assert!(a < b && b < c);
    assert_eq!(c, Stamp::new(1_000, 2));
}

#[test]
fn clock_stays_monotonic_when_wall_time_goes_backwards() {
    let source = MockClock::new(5_000);
    let clock = LogClock::with_clock(source.clone());

    let before = clock.now();
    source.set(1_000);
    let after = clock.now();

    assert!(after > before);
    assert_eq!(after.wall_ms, 5_000);
}

#[test]
fn clock_observe_moves_past_persisted_stamps() {
    let clock = LogClock::with_clock(MockClock::new(1_000));
    clock.observe(Stamp::new(9_000, 4));

    let next = clock.now();
    assert_eq!(next, Stamp::new(9_000, 5));
}

#[test]
fn clock_observe_ignores_older_stamps() {
    let clock = LogClock::with_clock(MockClock::new(1_000));
    clock.now();
    clock.observe(Stamp::new(10, 0));

    assert_eq!(clock.now(), Stamp::new(1_000, 1));
}
