// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation error taxonomy
//!
//! Leaf stores carry their own error enums; the coordinator folds them into
//! [`ReservationError`], whose [`ErrorKind`] decides retry and HTTP mapping.

use crate::booking::BookingId;
use crate::slot::{SlotId, SlotStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Malformed input. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("invalid interval: end {end} must be after start {start}")]
    EmptyInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("unknown slot status: {0}")]
    UnknownStatus(String),
    #[error("illegal slot transition {from} -> {to}")]
    IllegalTransition { from: SlotStatus, to: SlotStatus },
    #[error("amount must be a finite, non-negative number")]
    InvalidAmount,
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
}

/// Coarse error classes driving retry and status mapping
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    UpstreamUnavailable,
    InconsistentState,
}

/// Errors surfaced by the reservation coordinator
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("slot not found: {0}")]
    SlotNotFound(SlotId),

    #[error("slot not available: {slot_id}")]
    SlotUnavailable { slot_id: SlotId },

    #[error("slot {slot_id} is {actual}, expected {expected}")]
    Conflict {
        slot_id: SlotId,
        expected: SlotStatus,
        actual: SlotStatus,
    },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("inconsistent state for slot {slot_id}: {detail}")]
    InconsistentState { slot_id: SlotId, detail: String },
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::Validation(_) => ErrorKind::Validation,
            ReservationError::BookingNotFound(_) | ReservationError::SlotNotFound(_) => {
                ErrorKind::NotFound
            }
            ReservationError::SlotUnavailable { .. } | ReservationError::Conflict { .. } => {
                ErrorKind::Conflict
            }
            ReservationError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            ReservationError::InconsistentState { .. } => ErrorKind::InconsistentState,
        }
    }

    /// Only upstream failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::UpstreamUnavailable
    }
}
