// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn slot() -> SlotId {
    SlotId::new("slot-1")
}

#[parameterized(
    held = { Event::SlotHeld { slot_id: slot(), mentee_id: "a".into() }, "slot:held" },
    released = { Event::SlotReleased { slot_id: slot(), from: SlotStatus::Held }, "slot:released" },
    created = {
        Event::BookingCreated { booking_id: BookingId::new("bk-1"), slot_id: slot() },
        "booking:created"
    },
    stuck = {
        Event::SagaStuck { slot_id: slot(), phase: SagaPhase::Holding, reason: "timeout".into() },
        "saga:stuck"
    },
    inconsistent = {
        Event::InconsistentState { slot_id: slot(), detail: "two live bookings".into() },
        "saga:inconsistent"
    },
    repaired = {
        Event::SlotRepaired {
            slot_id: slot(),
            from: SlotStatus::Held,
            to: SlotStatus::Open,
            reason: "hold expired".into(),
        },
        "reconciler:repaired"
    },
)]
fn events_have_namespaced_names(event: Event, name: &str) {
    assert_eq!(event.name(), name);
    assert_eq!(event.slot_id(), &slot());
}

#[test]
fn events_serialize_with_type_tag() {
    let event = Event::SlotHeld {
        slot_id: slot(),
        mentee_id: "a".into(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "slot_held");
    assert_eq!(json["slot_id"], "slot-1");
    assert_eq!(serde_json::from_value::<Event>(json).unwrap(), event);
}
