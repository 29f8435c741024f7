// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slot publishing specs

use crate::prelude::*;

#[tokio::test]
async fn publish_creates_open_slots() {
    let service = Service::start();

    let reply = service
        .post(
            "/slots",
            json!({
                "mentorId": "m1",
                "slots": [
                    { "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T09:30:00Z" },
                    { "start": "2024-01-01T10:00:00Z", "end": "2024-01-01T10:30:00Z" },
                ],
            }),
        )
        .await
        .status_is(201)
        .has("/created", json!(2))
        .has("/slots/0/status", json!("OPEN"))
        .has("/slots/0/version", json!(0))
        .has("/rejected", json!([]));
    assert_ne!(reply.body["slots"][0]["id"], reply.body["slots"][1]["id"]);

    service
        .get("/slots?mentorId=m1&date=2024-01-01")
        .await
        .status_is(200)
        .has("/mentorId", json!("m1"))
        .has("/date", json!("2024-01-01"));
}

#[tokio::test]
async fn bad_intervals_are_reported_per_index() {
    let service = Service::start();

    service
        .post(
            "/slots",
            json!({
                "mentorId": "m1",
                "slots": [
                    { "start": "2024-01-01T09:30:00Z", "end": "2024-01-01T09:00:00Z" },
                    { "start": "2024-01-01T10:00:00Z", "end": "2024-01-01T10:30:00Z" },
                ],
            }),
        )
        .await
        .status_is(201)
        .has("/created", json!(1))
        .has("/rejected/0/index", json!(0));

    service
        .post(
            "/slots",
            json!({
                "mentorId": "m1",
                "slots": [{ "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T09:00:00Z" }],
            }),
        )
        .await
        .status_is(400)
        .has("/rejected/0/index", json!(0));
}

#[tokio::test]
async fn publish_requires_mentor_and_slots() {
    let service = Service::start();

    service
        .post("/slots", json!({ "mentorId": "m1", "slots": [] }))
        .await
        .status_is(400);
    service
        .post(
            "/slots",
            json!({ "slots": [{ "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T09:30:00Z" }] }),
        )
        .await
        .status_is(400);
}

#[tokio::test]
async fn listing_is_per_mentor_and_day() {
    let service = Service::start();
    service.publish("m1", "2024-01-01T23:30:00Z").await;
    service.publish("m1", "2024-01-02T00:00:00Z").await;
    service.publish("m2", "2024-01-01T09:00:00Z").await;

    let reply = service
        .get("/slots?mentorId=m1&date=2024-01-01")
        .await
        .status_is(200);
    assert_eq!(reply.body["slots"].as_array().map(Vec::len), Some(1));

    service.get("/slots?mentorId=m1").await.status_is(400);
    service
        .get("/slots?mentorId=m1&date=01-01-2024")
        .await
        .status_is(400);
}
