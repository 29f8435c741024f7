// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::slot::Interval;
use chrono::TimeZone;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
}

fn make_slot() -> Slot {
    let interval = Interval::new(at(9, 0), at(9, 30)).unwrap();
    Slot::new(SlotId::new("slot-1"), "m1", interval, at(8, 0))
}

fn make_booking(id: &str, mentee: &str, mentor: &str, start_h: u32, created_m: u32) -> Booking {
    let mut new = NewBooking::for_slot(&make_slot(), mentee, 0.0, DEFAULT_CURRENCY, "");
    new.mentor_id = mentor.to_string();
    new.start = at(start_h, 0);
    new.end = at(start_h, 30);
    new.into_booking(BookingId::new(id), at(8, created_m))
}

#[test]
fn new_booking_copies_slot_interval() {
    let slot = make_slot();
    let new = NewBooking::for_slot(&slot, "a", 25.0, "EUR", "hello");
    assert_eq!(new.start, slot.start);
    assert_eq!(new.end, slot.end);
    assert_eq!(new.mentor_id, "m1");
    assert_eq!(new.idempotency_key, IdempotencyKey("slot-1:a".to_string()));
}

#[test]
fn validate_rejects_bad_amounts() {
    let slot = make_slot();
    for amount in [-1.0, f64::NAN, f64::INFINITY] {
        let new = NewBooking::for_slot(&slot, "a", amount, DEFAULT_CURRENCY, "");
        assert_eq!(new.validate(), Err(ValidationError::InvalidAmount));
    }
}

#[test]
fn validate_requires_mentee() {
    let new = NewBooking::for_slot(&make_slot(), "", 0.0, DEFAULT_CURRENCY, "");
    assert_eq!(
        new.validate(),
        Err(ValidationError::MissingField { field: "menteeId" })
    );
}

#[test]
fn into_booking_is_confirmed() {
    let booking = make_booking("bk-1", "a", "m1", 9, 0);
    assert!(booking.is_live());
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(booking.cancelled_at.is_none());
}

#[test]
fn filter_matches_on_both_ids() {
    let booking = make_booking("bk-1", "a", "m1", 9, 0);
    assert!(BookingFilter::default().matches(&booking));
    assert!(BookingFilter {
        mentee_id: Some("a".into()),
        mentor_id: Some("m1".into()),
    }
    .matches(&booking));
    assert!(!BookingFilter {
        mentee_id: Some("b".into()),
        mentor_id: None,
    }
    .matches(&booking));
}

#[test]
fn order_sorts_schedule_and_history_views() {
    let mut bookings = vec![
        make_booking("late-start-first-created", "a", "m1", 11, 1),
        make_booking("early-start-last-created", "a", "m1", 9, 3),
        make_booking("mid", "a", "m1", 10, 2),
    ];

    BookingOrder::StartAsc.sort(&mut bookings);
    let ids: Vec<_> = bookings.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(
        ids,
        ["early-start-last-created", "mid", "late-start-first-created"]
    );

    BookingOrder::CreatedDesc.sort(&mut bookings);
    let ids: Vec<_> = bookings.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(
        ids,
        ["early-start-last-created", "mid", "late-start-first-created"]
    );
}

#[test]
fn booking_wire_format_is_camel_case() {
    let booking = make_booking("bk-1", "a", "m1", 9, 0);
    let json = serde_json::to_value(&booking).unwrap();
    assert_eq!(json["menteeId"], "a");
    assert_eq!(json["slotId"], "slot-1");
    assert_eq!(json["status"], "CONFIRMED");
    assert!(json.get("cancelledAt").is_none());
}
