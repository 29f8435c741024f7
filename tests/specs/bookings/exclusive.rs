// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutual exclusion specs
//!
//! Concurrent bookings of one slot produce exactly one booking.

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_mentees_race_for_one_slot() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;

    let requests = ["a", "b"].map(|mentee| {
        let router = service.router();
        let body = json!({ "menteeId": mentee, "mentorId": "m1", "slotId": slot_id });
        tokio::spawn(async move { send(router, "POST", "/bookings", Some(body)).await })
    });
    let mut statuses = Vec::new();
    for request in requests {
        statuses.push(request.await.unwrap().status.as_u16());
    }
    statuses.sort();

    assert_eq!(statuses, [201, 409]);
    assert_eq!(service.slot_status(&slot_id).await, "BOOKED");
    service
        .get("/bookings?mentorId=m1")
        .await
        .status_is(200)
        .has("/total", json!(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_bookings_have_one_winner() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let router = service.router();
        let body = json!({ "menteeId": format!("mentee-{}", i), "mentorId": "m1", "slotId": slot_id });
        handles.push(tokio::spawn(async move {
            send(router, "POST", "/bookings", Some(body)).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let reply = handle.await.unwrap();
        match reply.status.as_u16() {
            201 => created += 1,
            409 => assert_eq!(reply.body, json!({ "error": "slot not available" })),
            other => panic!("unexpected status {}: {}", other, reply.body),
        }
    }

    assert_eq!(created, 1);
    service
        .get("/status")
        .await
        .has("/slots/booked", json!(1))
        .has("/bookings/confirmed", json!(1));
}

#[tokio::test]
async fn booked_slot_is_not_rebooked_by_the_same_mentee() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;

    service.book("a", "m1", &slot_id).await.status_is(201);
    service.book("a", "m1", &slot_id).await.status_is(409);
}
