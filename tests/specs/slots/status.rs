// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional status transition specs

use crate::prelude::*;

#[tokio::test]
async fn transition_applies_when_expected_status_matches() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    let uri = format!("/slots/{}/status", slot_id);

    service
        .patch(&uri, json!({ "status": "HELD", "expectedStatus": "OPEN" }))
        .await
        .status_is(200)
        .has("/status", json!("HELD"))
        .has("/version", json!(1));

    service
        .patch(&uri, json!({ "status": "BOOKED", "expectedStatus": "HELD" }))
        .await
        .status_is(200)
        .has("/version", json!(2));
}

#[tokio::test]
async fn stale_expectation_conflicts_without_writing() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    let uri = format!("/slots/{}/status", slot_id);
    service
        .patch(&uri, json!({ "status": "HELD", "expectedStatus": "OPEN" }))
        .await
        .status_is(200);

    service
        .patch(&uri, json!({ "status": "HELD", "expectedStatus": "OPEN" }))
        .await
        .status_is(409)
        .has("/actual", json!("HELD"));

    service
        .get(&format!("/slots/{}", slot_id))
        .await
        .has("/version", json!(1));
}

#[tokio::test]
async fn unconditional_and_illegal_writes_are_refused() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    let uri = format!("/slots/{}/status", slot_id);

    service
        .patch(&uri, json!({ "status": "HELD" }))
        .await
        .status_is(400);
    service
        .patch(&uri, json!({ "status": "WAITLISTED", "expectedStatus": "OPEN" }))
        .await
        .status_is(400);
    service
        .patch("/slots/missing/status", json!({ "status": "HELD", "expectedStatus": "OPEN" }))
        .await
        .status_is(404);
}

#[tokio::test]
async fn held_slot_is_hidden_and_unbookable() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    service
        .patch(
            &format!("/slots/{}/status", slot_id),
            json!({ "status": "HELD", "expectedStatus": "OPEN" }),
        )
        .await
        .status_is(200);

    service
        .get("/slots?mentorId=m1&date=2024-01-01")
        .await
        .has("/slots", json!([]));
    service.book("a", "m1", &slot_id).await.status_is(409);
}
