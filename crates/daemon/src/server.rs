// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP router and request handlers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use sb_adapters::{BookingLedger, SlotStore, Transition, UserDirectory, UserSummary};
use sb_core::{Booking, BookingFilter, BookingId, BookingOrder, Slot, SlotId, ValidationError};
use sb_engine::{BookRequest, ReservationCoordinator};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::protocol::{
    BookingDetail, BookingsQuery, Cancelled, CreateBooking, Listing, OpenSlots, OpenSlotsQuery,
    PublishSlots, Published, SetStatus, StatusReport,
};

/// Everything the handlers share
pub struct AppState<S, L, U> {
    pub coordinator: ReservationCoordinator<S, L>,
    pub users: U,
    pub started: Instant,
}

impl<S, L, U> AppState<S, L, U> {
    pub fn new(coordinator: ReservationCoordinator<S, L>, users: U) -> Self {
        Self {
            coordinator,
            users,
            started: Instant::now(),
        }
    }
}

type Shared<S, L, U> = State<Arc<AppState<S, L, U>>>;

/// Build the API router
pub fn router<S, L, U>(state: AppState<S, L, U>) -> Router
where
    S: SlotStore,
    L: BookingLedger,
    U: UserDirectory,
{
    Router::new()
        .route("/slots", post(publish_slots::<S, L, U>).get(open_slots::<S, L, U>))
        .route("/slots/{id}", get(get_slot::<S, L, U>))
        .route("/slots/{id}/status", patch(set_status::<S, L, U>))
        .route("/bookings", post(create_booking::<S, L, U>).get(list_bookings::<S, L, U>))
        .route("/bookings/details", get(booking_details::<S, L, U>))
        .route("/bookings/{id}", delete(cancel_booking::<S, L, U>))
        .route("/status", get(status::<S, L, U>))
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(state))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!(%method, %path, status = response.status().as_u16(), elapsed_ms, "request");
    response
}

fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn publish_slots<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    request: Result<Json<PublishSlots>, JsonRejection>,
) -> Result<(StatusCode, Json<Published>), ApiError> {
    let request = body(request)?;
    if request.slots.is_empty() {
        return Err(ValidationError::MissingField { field: "slots" }.into());
    }
    let report = app
        .coordinator
        .slots()
        .publish(&request.mentor_id, &request.slots)
        .await?;
    if report.created.is_empty() {
        return Err(ApiError::NothingPublished {
            rejected: report.rejected,
        });
    }
    info!(
        mentor_id = %request.mentor_id,
        created = report.created.len(),
        rejected = report.rejected.len(),
        "slots published"
    );
    Ok((
        StatusCode::CREATED,
        Json(Published {
            created: report.created.len(),
            slots: report.created,
            rejected: report.rejected,
        }),
    ))
}

async fn open_slots<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<Json<OpenSlots>, ApiError> {
    let (mentor_id, date) = query.validate()?;
    let slots = app.coordinator.slots().list_open(&mentor_id, date).await?;
    Ok(Json(OpenSlots {
        mentor_id,
        date,
        slots,
    }))
}

async fn get_slot<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    Path(id): Path<String>,
) -> Result<Json<Slot>, ApiError> {
    let slot = app.coordinator.slots().get(&SlotId::new(id)).await?;
    Ok(Json(slot))
}

async fn set_status<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    Path(id): Path<String>,
    request: Result<Json<SetStatus>, JsonRejection>,
) -> Result<Json<Slot>, ApiError> {
    let (expected, new) = body(request)?.validate()?;
    let id = SlotId::new(id);
    match app
        .coordinator
        .slots()
        .transition_if(&id, expected, new)
        .await?
    {
        Transition::Applied(slot) => Ok(Json(slot)),
        Transition::Conflict { actual } => Err(ApiError::StatusConflict { slot_id: id, actual }),
    }
}

async fn create_booking<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    request: Result<Json<CreateBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let request = BookRequest::from(body(request)?);
    let booking = app.coordinator.book(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Listing<Booking>>, ApiError> {
    let bookings = app
        .coordinator
        .ledger()
        .list(&BookingFilter::from(query), BookingOrder::CreatedDesc)
        .await?;
    Ok(Json(bookings.into()))
}

async fn booking_details<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Listing<BookingDetail>>, ApiError> {
    let bookings = app
        .coordinator
        .ledger()
        .list(&BookingFilter::from(query), BookingOrder::StartAsc)
        .await?;

    let mut profiles = Profiles::new(&app.users);
    let mut items = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let mentee = profiles.get(&booking.mentee_id).await;
        let mentor = profiles.get(&booking.mentor_id).await;
        items.push(BookingDetail {
            booking,
            mentee,
            mentor,
        });
    }
    Ok(Json(items.into()))
}

async fn cancel_booking<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
    Path(id): Path<String>,
) -> Result<Json<Cancelled>, ApiError> {
    app.coordinator.cancel(&BookingId::new(id)).await?;
    Ok(Json(Cancelled { ok: true }))
}

async fn status<S: SlotStore, L: BookingLedger, U: UserDirectory>(
    State(app): Shared<S, L, U>,
) -> Result<Json<StatusReport>, ApiError> {
    let slots = app.coordinator.slots().counts().await?;
    let bookings = app.coordinator.ledger().counts().await?;
    Ok(Json(StatusReport {
        uptime_secs: app.started.elapsed().as_secs(),
        slots,
        bookings,
    }))
}

/// Per-request memo of user lookups; failures degrade to `None`
struct Profiles<'a, U> {
    users: &'a U,
    seen: HashMap<String, Option<UserSummary>>,
}

impl<'a, U: UserDirectory> Profiles<'a, U> {
    fn new(users: &'a U) -> Self {
        Self {
            users,
            seen: HashMap::new(),
        }
    }

    async fn get(&mut self, id: &str) -> Option<UserSummary> {
        if let Some(hit) = self.seen.get(id) {
            return hit.clone();
        }
        let found = match self.users.lookup(id).await {
            Ok(found) => found,
            Err(e) => {
                debug!(user_id = id, error = %e, "user lookup failed");
                None
            }
        };
        self.seen.insert(id.to_string(), found.clone());
        found
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
