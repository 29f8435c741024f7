// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead logs
//!
//! The slot registry and the booking ledger are independently owned, so each
//! has its own log and its own operation type. Operations record outcomes,
//! not requests: a conditional transition is only logged once it has been
//! checked and accepted.

use crate::booking::{Booking, BookingId};
use crate::slot::{Slot, SlotId, SlotStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operations persisted to the slot log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlotOp {
    /// A mentor published a slot
    Publish { slot: Slot },

    /// An accepted conditional status change
    Transition {
        id: SlotId,
        from: SlotStatus,
        to: SlotStatus,
        at: DateTime<Utc>,
    },
}

/// Operations persisted to the booking log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerOp {
    /// A confirmed booking row was written
    Create { booking: Booking },

    /// A booking was cancelled
    Cancel { id: BookingId, at: DateTime<Utc> },
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
