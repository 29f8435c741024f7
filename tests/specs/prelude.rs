// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness: the full router over fake stores, driven in-process

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use sb_adapters::{FakeBookingLedger, FakeSlotStore, FakeUserDirectory};
use sb_core::{FakeClock, RetryPolicy};
use sb_daemon::{router, AppState};
use sb_engine::{CoordinatorConfig, ReservationCoordinator};
use std::time::Duration;
use tower::ServiceExt;

pub use serde_json::{json, Value};

pub struct Service {
    router: Router,
    pub clock: FakeClock,
    pub slots: FakeSlotStore,
    pub ledger: FakeBookingLedger,
    pub users: FakeUserDirectory,
}

impl Service {
    pub fn start() -> Self {
        let clock = FakeClock::at(Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap());
        let slots = FakeSlotStore::new(clock.clone());
        let ledger = FakeBookingLedger::new(clock.clone());
        let users = FakeUserDirectory::new();
        let coordinator = ReservationCoordinator::new(
            slots.clone(),
            ledger.clone(),
            CoordinatorConfig {
                call_timeout: Duration::from_secs(1),
                retry: RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(5)),
            },
        );
        Self {
            router: router(AppState::new(coordinator, users.clone())),
            clock,
            slots,
            ledger,
            users,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn get(&self, uri: &str) -> Reply {
        send(self.router(), "GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Reply {
        send(self.router(), "POST", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> Reply {
        send(self.router(), "PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Reply {
        send(self.router(), "DELETE", uri, None).await
    }

    /// Publish one half-hour slot for `mentor` starting at `start`, returning its id
    pub async fn publish(&self, mentor: &str, start: &str) -> String {
        let begin = chrono::DateTime::parse_from_rfc3339(start).unwrap();
        let end = begin + chrono::Duration::minutes(30);
        let reply = self
            .post(
                "/slots",
                json!({
                    "mentorId": mentor,
                    "slots": [{ "start": start, "end": end.to_rfc3339() }],
                }),
            )
            .await
            .status_is(201);
        reply.body["slots"][0]["id"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, mentee: &str, mentor: &str, slot_id: &str) -> Reply {
        self.post(
            "/bookings",
            json!({ "menteeId": mentee, "mentorId": mentor, "slotId": slot_id }),
        )
        .await
    }

    pub async fn slot_status(&self, slot_id: &str) -> String {
        let reply = self.get(&format!("/slots/{}", slot_id)).await.status_is(200);
        reply.body["status"].as_str().unwrap().to_string()
    }
}

pub async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply { status, body }
}

#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn status_is(self, code: u16) -> Self {
        assert_eq!(self.status.as_u16(), code, "unexpected status, body: {}", self.body);
        self
    }

    /// Assert the value at a JSON pointer
    pub fn has(self, pointer: &str, expected: Value) -> Self {
        similar_asserts::assert_eq!(
            self.body.pointer(pointer).cloned().unwrap_or(Value::Null),
            expected,
            "at {}",
            pointer
        );
        self
    }

    pub fn items(&self) -> Vec<Value> {
        self.body["items"].as_array().cloned().unwrap_or_default()
    }
}
