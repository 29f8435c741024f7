// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP mapping of the error taxonomy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sb_adapters::{LedgerError, RejectedInterval, SlotStoreError};
use sb_core::{ErrorKind, ReservationError, SlotId, SlotStatus, ValidationError};
use serde_json::json;
use thiserror::Error;

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Reservation(#[from] ReservationError),

    /// Unreadable body or query string
    #[error("{0}")]
    BadRequest(String),

    /// Every interval of a publish request was rejected
    #[error("no valid slots to publish")]
    NothingPublished { rejected: Vec<RejectedInterval> },

    /// Compare-and-set lost
    #[error("slot {slot_id} is {actual}")]
    StatusConflict { slot_id: SlotId, actual: SlotStatus },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Reservation(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::InconsistentState => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) | ApiError::NothingPublished { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::StatusConflict { .. } => StatusCode::CONFLICT,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Reservation(e.into())
    }
}

impl From<SlotStoreError> for ApiError {
    fn from(e: SlotStoreError) -> Self {
        let e = match e {
            SlotStoreError::NotFound(id) => ReservationError::SlotNotFound(id),
            SlotStoreError::Invalid(e) => ReservationError::Validation(e),
            SlotStoreError::Unavailable(detail) => ReservationError::UpstreamUnavailable(detail),
        };
        ApiError::Reservation(e)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let e = match e {
            LedgerError::NotFound(id) => ReservationError::BookingNotFound(id),
            LedgerError::Invalid(e) => ReservationError::Validation(e),
            LedgerError::Conflict { slot_id, .. } => ReservationError::SlotUnavailable { slot_id },
            LedgerError::Unavailable(detail) => ReservationError::UpstreamUnavailable(detail),
        };
        ApiError::Reservation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = match &self {
            // Which slot and why stays in the log
            ApiError::Reservation(ReservationError::SlotUnavailable { .. }) => {
                json!({ "error": "slot not available" })
            }
            ApiError::NothingPublished { rejected } => {
                json!({ "error": self.to_string(), "rejected": rejected })
            }
            ApiError::StatusConflict { actual, .. } => {
                json!({ "error": self.to_string(), "actual": actual })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
