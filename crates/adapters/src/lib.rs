// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Repository interfaces for the slot registry, the booking ledger and the
//! users collaborator, with durable, traced and fake implementations

pub mod ledger;
pub mod slots;
pub mod traced;
pub mod users;

pub use ledger::{BookingLedger, DurableBookingLedger, LedgerError};
pub use slots::{
    DurableSlotStore, PublishReport, RejectedInterval, RequestedInterval, SlotStore,
    SlotStoreError, Transition,
};
pub use traced::{TracedBookingLedger, TracedSlotStore};
pub use users::{HttpUserDirectory, NoOpUserDirectory, UserDirectory, UserError, UserSummary};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use ledger::{FakeBookingLedger, LedgerCall};
#[cfg(any(test, feature = "test-support"))]
pub use slots::{FakeSlotStore, SlotCall};
#[cfg(any(test, feature = "test-support"))]
pub use users::FakeUserDirectory;
