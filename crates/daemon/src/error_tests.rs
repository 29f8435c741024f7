// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use http_body_util::BodyExt;
use sb_core::BookingId;
use yare::parameterized;

async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[parameterized(
    validation = { ApiError::from(ValidationError::InvalidAmount), 400 },
    bad_body = { ApiError::BadRequest("expected value".into()), 400 },
    slot_missing = { ApiError::from(SlotStoreError::NotFound(SlotId::new("s"))), 404 },
    booking_missing = { ApiError::from(LedgerError::NotFound(BookingId::new("b"))), 404 },
    taken = { ApiError::from(ReservationError::SlotUnavailable { slot_id: SlotId::new("s") }), 409 },
    cas_lost = { ApiError::StatusConflict { slot_id: SlotId::new("s"), actual: SlotStatus::Held }, 409 },
    store_down = { ApiError::from(SlotStoreError::Unavailable("disk".into())), 503 },
    ledger_down = { ApiError::from(LedgerError::Unavailable("disk".into())), 503 },
    inconsistent = {
        ApiError::from(ReservationError::InconsistentState {
            slot_id: SlotId::new("s"),
            detail: "x".into(),
        }),
        500
    },
)]
fn maps_status_codes(err: ApiError, code: u16) {
    assert_eq!(err.status_code().as_u16(), code);
}

#[tokio::test]
async fn slot_unavailable_body_is_generic() {
    let (status, body) = body_of(
        ReservationError::SlotUnavailable {
            slot_id: SlotId::new("s-9"),
        }
        .into(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "slot not available" }));
}

#[tokio::test]
async fn status_conflict_reports_actual() {
    let (_, body) = body_of(ApiError::StatusConflict {
        slot_id: SlotId::new("s-1"),
        actual: SlotStatus::Booked,
    })
    .await;
    assert_eq!(body["actual"], "BOOKED");
    assert_eq!(body["error"], "slot s-1 is BOOKED");
}

#[tokio::test]
async fn nothing_published_lists_rejections() {
    let (status, body) = body_of(ApiError::NothingPublished {
        rejected: vec![RejectedInterval {
            index: 0,
            error: "bad".into(),
        }],
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["rejected"], json!([{ "index": 0, "error": "bad" }]));
}
