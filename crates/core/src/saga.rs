// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-attempt saga phase machine
//!
//! ```text
//! Init -> Holding -> HeldOk -> LedgerWritten -> Confirming -> Done
//!            |          |                          |
//!            v          v                          v
//!          Stuck   Compensating -> RolledBack     Stuck
//!                       |
//!                       v
//!                     Stuck
//! ```
//!
//! `Stuck` means the attempt left the slot in a non-terminal state that the
//! reconciler must resolve.

use crate::slot::SlotId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaPhase {
    Init,
    Holding,
    HeldOk,
    LedgerWritten,
    Confirming,
    Done,
    Compensating,
    RolledBack,
    Stuck,
}

impl SagaPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaPhase::Done | SagaPhase::RolledBack | SagaPhase::Stuck
        )
    }

    pub fn can_advance_to(self, next: SagaPhase) -> bool {
        use SagaPhase::*;
        matches!(
            (self, next),
            (Init, Holding)
                | (Holding, HeldOk)
                // hold lost the race: the attempt ends without side effects
                | (Holding, RolledBack)
                | (Holding, Stuck)
                | (HeldOk, LedgerWritten)
                | (HeldOk, Compensating)
                | (HeldOk, Stuck)
                | (LedgerWritten, Confirming)
                | (Confirming, Done)
                | (Confirming, Stuck)
                | (Compensating, RolledBack)
                | (Compensating, Stuck)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SagaPhase::Init => "INIT",
            SagaPhase::Holding => "HOLDING",
            SagaPhase::HeldOk => "HELD_OK",
            SagaPhase::LedgerWritten => "LEDGER_WRITTEN",
            SagaPhase::Confirming => "CONFIRMING",
            SagaPhase::Done => "DONE",
            SagaPhase::Compensating => "COMPENSATING",
            SagaPhase::RolledBack => "ROLLED_BACK",
            SagaPhase::Stuck => "STUCK",
        }
    }
}

impl fmt::Display for SagaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The phase history of one booking attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaTrace {
    pub slot_id: SlotId,
    pub mentee_id: String,
    phases: Vec<SagaPhase>,
}

impl SagaTrace {
    pub fn new(slot_id: SlotId, mentee_id: impl Into<String>) -> Self {
        Self {
            slot_id,
            mentee_id: mentee_id.into(),
            phases: vec![SagaPhase::Init],
        }
    }

    pub fn phase(&self) -> SagaPhase {
        self.phases.last().copied().unwrap_or(SagaPhase::Init)
    }

    pub fn phases(&self) -> &[SagaPhase] {
        &self.phases
    }

    /// Record the next phase
    ///
    /// Returns false and leaves the trace unchanged for an illegal edge.
    pub fn advance(&mut self, next: SagaPhase) -> bool {
        let current = self.phase();
        if !current.can_advance_to(next) {
            tracing::warn!(
                slot_id = %self.slot_id,
                from = %current,
                to = %next,
                "illegal saga phase edge"
            );
            return false;
        }
        tracing::debug!(slot_id = %self.slot_id, from = %current, to = %next, "saga phase");
        self.phases.push(next);
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

#[cfg(test)]
#[path = "saga_tests.rs"]
mod tests;
