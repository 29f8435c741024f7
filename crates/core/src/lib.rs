// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sb-core: domain model for the slot reservation service
//!
//! This crate provides:
//! - Slot and booking records with their status state machines
//! - The per-attempt saga phase machine
//! - Domain events and WAL operations
//! - The reservation error taxonomy and retry policy
//! - Clock and ID abstractions for deterministic tests

pub mod clock;
pub mod id;

pub mod booking;
pub mod error;
pub mod event;
pub mod operation;
pub mod retry;
pub mod saga;
pub mod slot;

// Re-exports
pub use booking::{
    Booking, BookingFilter, BookingId, BookingOrder, BookingStatus, IdempotencyKey, NewBooking,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ErrorKind, ReservationError, ValidationError};
pub use event::Event;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use operation::{LedgerOp, SlotOp};
pub use retry::RetryPolicy;
pub use saga::{SagaPhase, SagaTrace};
pub use slot::{day_window, Interval, Slot, SlotId, SlotStatus};
