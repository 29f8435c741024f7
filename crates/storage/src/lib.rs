// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sb-storage: write-ahead logs and the tables they materialize

mod state;
mod wal;

pub use state::{BookingCounts, BookingTable, CreatePlan, SlotCounts, SlotTable, TransitionPlan};
pub use wal::{Wal, WalError};
