// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking ledger adapters
//!
//! The ledger is the source of truth for who owns a slot.

mod durable;

pub use durable::DurableBookingLedger;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBookingLedger, LedgerCall};

use async_trait::async_trait;
use sb_core::{
    Booking, BookingFilter, BookingId, BookingOrder, NewBooking, SlotId, ValidationError,
};
use sb_storage::{BookingCounts, WalError};
use thiserror::Error;

/// Errors from booking ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("booking not found: {0}")]
    NotFound(BookingId),
    #[error("slot {slot_id} already has live booking {existing}")]
    Conflict { slot_id: SlotId, existing: BookingId },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl From<WalError> for LedgerError {
    fn from(e: WalError) -> Self {
        LedgerError::Unavailable(e.to_string())
    }
}

/// Durable record of bookings
#[async_trait]
pub trait BookingLedger: Clone + Send + Sync + 'static {
    /// Insert a confirmed booking
    ///
    /// Repeating a create with the same idempotency key while the first row
    /// is live returns that row instead of writing a second one.
    async fn create(&self, new: NewBooking) -> Result<Booking, LedgerError>;

    /// Mark a booking cancelled. Cancelling twice returns the cancelled row.
    async fn cancel(&self, id: &BookingId) -> Result<Booking, LedgerError>;

    async fn get(&self, id: &BookingId) -> Result<Booking, LedgerError>;

    /// The confirmed booking for a slot, if any
    async fn live_for_slot(&self, slot_id: &SlotId) -> Result<Option<Booking>, LedgerError>;

    async fn list(
        &self,
        filter: &BookingFilter,
        order: BookingOrder,
    ) -> Result<Vec<Booking>, LedgerError>;

    async fn counts(&self) -> Result<BookingCounts, LedgerError>;
}
