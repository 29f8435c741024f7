// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
}

#[test]
fn interval_requires_end_after_start() {
    assert!(Interval::new(at(9, 0), at(9, 30)).is_ok());
    assert!(matches!(
        Interval::new(at(9, 30), at(9, 30)),
        Err(ValidationError::EmptyInterval { .. })
    ));
    assert!(matches!(
        Interval::new(at(10, 0), at(9, 0)),
        Err(ValidationError::EmptyInterval { .. })
    ));
}

#[parameterized(
    inside = { (9, 0), (9, 30), true },
    touching_end_is_outside = { (8, 0), (9, 0), false },
    straddles_start = { (8, 30), (9, 15), true },
    after = { (10, 0), (11, 0), false },
)]
fn interval_overlap(from: (u32, u32), to: (u32, u32), expected: bool) {
    let interval = Interval::new(at(9, 0), at(10, 0)).unwrap();
    assert_eq!(
        interval.overlaps(at(from.0, from.1), at(to.0, to.1)),
        expected
    );
}

#[test]
fn day_window_covers_one_utc_day() {
    let (start, end) = day_window(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(start, at(0, 0));
    assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
}

#[parameterized(
    open_to_held = { SlotStatus::Open, SlotStatus::Held, true },
    held_to_booked = { SlotStatus::Held, SlotStatus::Booked, true },
    held_to_open = { SlotStatus::Held, SlotStatus::Open, true },
    booked_to_open = { SlotStatus::Booked, SlotStatus::Open, true },
    open_to_booked_repair = { SlotStatus::Open, SlotStatus::Booked, true },
    booked_to_held = { SlotStatus::Booked, SlotStatus::Held, false },
    open_to_open = { SlotStatus::Open, SlotStatus::Open, false },
    held_to_held = { SlotStatus::Held, SlotStatus::Held, false },
)]
fn slot_status_edges(from: SlotStatus, to: SlotStatus, legal: bool) {
    assert_eq!(from.can_transition_to(to), legal);
}

#[test]
fn slot_status_parses_case_insensitively() {
    assert_eq!("open".parse::<SlotStatus>().unwrap(), SlotStatus::Open);
    assert_eq!("BOOKED".parse::<SlotStatus>().unwrap(), SlotStatus::Booked);
    assert!(matches!(
        "PENDING".parse::<SlotStatus>(),
        Err(ValidationError::UnknownStatus(_))
    ));
}

#[test]
fn slot_status_serializes_uppercase() {
    let json = serde_json::to_string(&SlotStatus::Held).unwrap();
    assert_eq!(json, "\"HELD\"");
}

#[test]
fn new_slot_is_open_at_version_zero() {
    let interval = Interval::new(at(9, 0), at(9, 30)).unwrap();
    let slot = Slot::new(SlotId::new("slot-1"), "m1", interval, at(8, 0));
    assert!(slot.is_open());
    assert_eq!(slot.version, 0);
    assert_eq!(slot.interval(), interval);
}

#[test]
fn apply_status_bumps_version_and_stamps_time() {
    let interval = Interval::new(at(9, 0), at(9, 30)).unwrap();
    let mut slot = Slot::new(SlotId::new("slot-1"), "m1", interval, at(8, 0));

    slot.apply_status(SlotStatus::Held, at(8, 5));
    assert_eq!(slot.status, SlotStatus::Held);
    assert_eq!(slot.version, 1);
    assert_eq!(slot.status_age(at(8, 6)), Duration::from_secs(60));
}

#[test]
fn slot_serializes_camel_case() {
    let interval = Interval::new(at(9, 0), at(9, 30)).unwrap();
    let slot = Slot::new(SlotId::new("slot-1"), "m1", interval, at(8, 0));
    let json = serde_json::to_value(&slot).unwrap();
    assert_eq!(json["mentorId"], "m1");
    assert_eq!(json["status"], "OPEN");
    assert_eq!(json["start"], "2024-01-01T09:00:00Z");
}

use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = SlotStatus> {
    prop_oneof![
        Just(SlotStatus::Open),
        Just(SlotStatus::Held),
        Just(SlotStatus::Booked),
    ]
}

proptest! {
    #[test]
    fn no_status_may_transition_to_itself(status in arb_status()) {
        prop_assert!(!status.can_transition_to(status));
    }

    #[test]
    fn every_status_can_reach_open(status in arb_status()) {
        // Open is reachable from every non-open state in one step
        prop_assert!(status == SlotStatus::Open || status.can_transition_to(SlotStatus::Open));
    }
}
