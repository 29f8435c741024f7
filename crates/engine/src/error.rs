// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store call failures and their mapping into the reservation taxonomy

use sb_adapters::{LedgerError, SlotStoreError};
use sb_core::{ReservationError, SlotId};
use std::time::Duration;
use thiserror::Error;

/// A store call that failed or ran out of time
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error("{0}")]
    Failed(E),
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Store errors that may succeed when repeated
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for SlotStoreError {
    fn is_transient(&self) -> bool {
        matches!(self, SlotStoreError::Unavailable(_))
    }
}

impl Transient for LedgerError {
    fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_))
    }
}

impl<E: Transient> CallError<E> {
    /// Timeouts and upstream outages are retried; answers are not
    pub fn is_retryable(&self) -> bool {
        match self {
            CallError::Failed(e) => e.is_transient(),
            CallError::TimedOut(_) => true,
        }
    }
}

impl CallError<SlotStoreError> {
    pub(crate) fn into_reservation(self, slot_id: &SlotId) -> ReservationError {
        match self {
            CallError::Failed(SlotStoreError::NotFound(id)) => ReservationError::SlotNotFound(id),
            CallError::Failed(SlotStoreError::Invalid(e)) => ReservationError::Validation(e),
            other => ReservationError::UpstreamUnavailable(format!("slot {}: {}", slot_id, other)),
        }
    }
}

impl CallError<LedgerError> {
    pub(crate) fn into_reservation(self) -> ReservationError {
        match self {
            CallError::Failed(LedgerError::NotFound(id)) => ReservationError::BookingNotFound(id),
            CallError::Failed(LedgerError::Invalid(e)) => ReservationError::Validation(e),
            CallError::Failed(LedgerError::Conflict { slot_id, .. }) => {
                ReservationError::SlotUnavailable { slot_id }
            }
            other => ReservationError::UpstreamUnavailable(format!("booking ledger: {}", other)),
        }
    }
}
