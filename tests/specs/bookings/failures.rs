// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partial failure specs
//!
//! Store failures mid-saga leave the slot bookable or for the reconciler.

use crate::prelude::*;

#[tokio::test]
async fn ledger_outage_compensates_the_hold() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    service.ledger.fail_creates(2);

    service.book("a", "m1", &slot_id).await.status_is(503);

    assert_eq!(service.slot_status(&slot_id).await, "OPEN");
    service
        .get("/slots?mentorId=m1&date=2024-01-01")
        .await
        .has("/slots/0/id", json!(slot_id));
    service.book("b", "m1", &slot_id).await.status_is(201);
}

#[tokio::test]
async fn transient_ledger_failure_is_retried() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    service.ledger.fail_creates(1);

    service.book("a", "m1", &slot_id).await.status_is(201);
    assert_eq!(service.ledger.create_attempts(), 2);
}

#[tokio::test]
async fn retried_write_is_not_duplicated() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    service.ledger.lose_create_acks(1);

    service.book("a", "m1", &slot_id).await.status_is(201);

    service
        .get("/status")
        .await
        .has("/bookings/confirmed", json!(1))
        .has("/slots/booked", json!(1));
}

#[tokio::test]
async fn unknown_or_foreign_slot_is_unavailable() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;

    service.book("a", "m1", "no-such-slot").await.status_is(409);
    service.book("a", "m2", &slot_id).await.status_is(409);
    service
        .post("/bookings", json!({ "mentorId": "m1", "slotId": slot_id }))
        .await
        .status_is(400)
        .has("/error", json!("validation error: menteeId is required"));
}
