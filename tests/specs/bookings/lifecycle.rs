// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking lifecycle specs
//!
//! Publish, list, book, cancel, and the listing views.

use crate::prelude::*;

#[tokio::test]
async fn round_trip_publish_book_cancel() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    let day = "/slots?mentorId=m1&date=2024-01-01";

    service
        .get(day)
        .await
        .status_is(200)
        .has("/slots/0/id", json!(slot_id));

    let booking = service.book("a", "m1", &slot_id).await.status_is(201);
    let booking_id = booking.body["id"].as_str().unwrap().to_string();
    assert_eq!(service.slot_status(&slot_id).await, "BOOKED");
    service.get(day).await.has("/slots", json!([]));

    service
        .delete(&format!("/bookings/{}", booking_id))
        .await
        .status_is(200)
        .has("/ok", json!(true));
    assert_eq!(service.slot_status(&slot_id).await, "OPEN");
    service.get(day).await.has("/slots/0/id", json!(slot_id));

    // Bookable again
    service.book("b", "m1", &slot_id).await.status_is(201);
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;
    let booking = service.book("a", "m1", &slot_id).await.status_is(201);
    let uri = format!("/bookings/{}", booking.body["id"].as_str().unwrap());

    service.delete(&uri).await.status_is(200);
    service.delete(&uri).await.status_is(200);

    service
        .get("/bookings?menteeId=a")
        .await
        .has("/items/0/status", json!("CANCELLED"))
        .has("/total", json!(1));
    service.delete("/bookings/missing").await.status_is(404);
}

#[tokio::test]
async fn booking_copies_the_slot_interval() {
    let service = Service::start();
    let slot_id = service.publish("m1", "2024-01-01T09:00:00Z").await;

    service
        .post(
            "/bookings",
            json!({
                "menteeId": "a",
                "mentorId": "m1",
                "slotId": slot_id,
                "amount": 40,
                "currency": "EUR",
                "notes": "intro call",
            }),
        )
        .await
        .status_is(201)
        .has("/start", json!("2024-01-01T09:00:00Z"))
        .has("/end", json!("2024-01-01T09:30:00Z"))
        .has("/amount", json!(40.0))
        .has("/currency", json!("EUR"))
        .has("/notes", json!("intro call"))
        .has("/status", json!("CONFIRMED"));
}

#[tokio::test]
async fn schedule_view_is_enriched_and_ordered_by_start() {
    let service = Service::start();
    service.users.add("a", "Ada", "ada@example.com");
    service.users.add("m1", "Grace", "grace@example.com");
    let late = service.publish("m1", "2024-01-01T11:00:00Z").await;
    let early = service.publish("m1", "2024-01-01T09:00:00Z").await;
    service.book("a", "m1", &late).await.status_is(201);
    service.book("a", "m1", &early).await.status_is(201);

    let reply = service
        .get("/bookings/details?menteeId=a")
        .await
        .status_is(200)
        .has("/total", json!(2))
        .has("/items/0/slotId", json!(early))
        .has("/items/0/mentor/name", json!("Grace"))
        .has("/items/1/mentee/email", json!("ada@example.com"));

    // The history view is newest first
    service.clock.advance(std::time::Duration::from_secs(1));
    let third = service.publish("m1", "2024-01-01T08:00:00Z").await;
    service.book("a", "m1", &third).await.status_is(201);
    let history = service.get("/bookings?menteeId=a").await.status_is(200);
    assert_eq!(history.items()[0]["slotId"], json!(third));
    assert_eq!(reply.items().len(), 2);
}
