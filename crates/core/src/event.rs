// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events emitted by the coordinator and reconciler

use crate::booking::BookingId;
use crate::saga::SagaPhase;
use crate::slot::{SlotId, SlotStatus};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SlotHeld {
        slot_id: SlotId,
        mentee_id: String,
    },
    SlotReleased {
        slot_id: SlotId,
        from: SlotStatus,
    },
    BookingCreated {
        booking_id: BookingId,
        slot_id: SlotId,
    },
    BookingConfirmed {
        booking_id: BookingId,
        slot_id: SlotId,
    },
    BookingCancelled {
        booking_id: BookingId,
        slot_id: SlotId,
    },
    SagaCompensated {
        slot_id: SlotId,
        reason: String,
    },
    SagaStuck {
        slot_id: SlotId,
        phase: SagaPhase,
        reason: String,
    },
    InconsistentState {
        slot_id: SlotId,
        detail: String,
    },
    SlotRepaired {
        slot_id: SlotId,
        from: SlotStatus,
        to: SlotStatus,
        reason: String,
    },
}

impl Event {
    /// Stable event name, used as the `event` log field
    pub fn name(&self) -> &'static str {
        match self {
            Event::SlotHeld { .. } => "slot:held",
            Event::SlotReleased { .. } => "slot:released",
            Event::BookingCreated { .. } => "booking:created",
            Event::BookingConfirmed { .. } => "booking:confirmed",
            Event::BookingCancelled { .. } => "booking:cancelled",
            Event::SagaCompensated { .. } => "saga:compensated",
            Event::SagaStuck { .. } => "saga:stuck",
            Event::InconsistentState { .. } => "saga:inconsistent",
            Event::SlotRepaired { .. } => "reconciler:repaired",
        }
    }

    pub fn slot_id(&self) -> &SlotId {
        match self {
            Event::SlotHeld { slot_id, .. }
            | Event::SlotReleased { slot_id, .. }
            | Event::BookingCreated { slot_id, .. }
            | Event::BookingConfirmed { slot_id, .. }
            | Event::BookingCancelled { slot_id, .. }
            | Event::SagaCompensated { slot_id, .. }
            | Event::SagaStuck { slot_id, .. }
            | Event::InconsistentState { slot_id, .. }
            | Event::SlotRepaired { slot_id, .. } => slot_id,
        }
    }

    /// Log the event at a level matching its severity
    pub fn log(&self) {
        let name = self.name();
        let slot_id = self.slot_id();
        match self {
            Event::SagaStuck { phase, reason, .. } => {
                tracing::warn!(event = name, %slot_id, %phase, reason = %reason, "saga stuck")
            }
            Event::InconsistentState { detail, .. } => {
                tracing::error!(event = name, %slot_id, detail = %detail, "inconsistent state")
            }
            Event::SlotRepaired {
                from, to, reason, ..
            } => tracing::info!(event = name, %slot_id, %from, %to, reason = %reason, "slot repaired"),
            other => tracing::info!(event = name, %slot_id, payload = ?other, "event"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
