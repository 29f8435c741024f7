// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake booking ledger for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BookingLedger, DurableBookingLedger, LedgerError};
use async_trait::async_trait;
use sb_core::{
    Booking, BookingFilter, BookingId, BookingOrder, FakeClock, NewBooking, SequentialIdGen,
    SlotId,
};
use sb_storage::BookingCounts;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Recorded ledger call
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    Create { slot_id: SlotId, mentee_id: String },
    Cancel { id: BookingId },
    Get { id: BookingId },
    LiveForSlot { slot_id: SlotId },
    List,
    Counts,
}

#[derive(Default)]
struct Faults {
    failing_creates: u32,
    lost_create_acks: u32,
    failing_cancels: u32,
    create_delay: Option<Duration>,
    fail_reads: bool,
}

fn take(budget: &mut u32) -> bool {
    if *budget > 0 {
        *budget -= 1;
        true
    } else {
        false
    }
}

/// Fake booking ledger with scripted faults
#[derive(Clone)]
pub struct FakeBookingLedger {
    ledger: DurableBookingLedger<FakeClock, SequentialIdGen>,
    faults: Arc<Mutex<Faults>>,
    calls: Arc<Mutex<Vec<LedgerCall>>>,
}

impl Default for FakeBookingLedger {
    fn default() -> Self {
        Self::new(FakeClock::new())
    }
}

impl FakeBookingLedger {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            ledger: DurableBookingLedger::in_memory(clock, SequentialIdGen::new("bk")),
            faults: Arc::new(Mutex::new(Faults::default())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of create calls seen, including failed ones
    pub fn create_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LedgerCall::Create { .. }))
            .count()
    }

    /// Fail the next `times` creates without writing
    pub fn fail_creates(&self, times: u32) {
        self.faults().failing_creates = times;
    }

    /// Write the next `times` creates but report failure
    pub fn lose_create_acks(&self, times: u32) {
        self.faults().lost_create_acks = times;
    }

    pub fn fail_cancels(&self, times: u32) {
        self.faults().failing_cancels = times;
    }

    /// Sleep before every create
    pub fn set_create_delay(&self, delay: Option<Duration>) {
        self.faults().create_delay = delay;
    }

    /// Fail `live_for_slot` and `list`
    pub fn set_fail_reads(&self, fail: bool) {
        self.faults().fail_reads = fail;
    }

    /// Write a booking, bypassing faults and call recording
    pub async fn seed(&self, new: NewBooking) -> Option<Booking> {
        self.ledger.create(new).await.ok()
    }

    /// Read the live booking for a slot, bypassing faults and call recording
    pub async fn peek_live(&self, slot_id: &SlotId) -> Option<Booking> {
        self.ledger.live_for_slot(slot_id).await.ok().flatten()
    }

    fn record(&self, call: LedgerCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reads_failing(&self) -> Result<(), LedgerError> {
        if self.faults().fail_reads {
            Err(LedgerError::Unavailable("injected read failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BookingLedger for FakeBookingLedger {
    async fn create(&self, new: NewBooking) -> Result<Booking, LedgerError> {
        self.record(LedgerCall::Create {
            slot_id: new.slot_id.clone(),
            mentee_id: new.mentee_id.clone(),
        });

        let delay = self.faults().create_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failed = take(&mut self.faults().failing_creates);
        if failed {
            return Err(LedgerError::Unavailable("injected create failure".into()));
        }
        let booking = self.ledger.create(new).await?;
        let lost = take(&mut self.faults().lost_create_acks);
        if lost {
            return Err(LedgerError::Unavailable("injected lost ack".into()));
        }
        Ok(booking)
    }

    async fn cancel(&self, id: &BookingId) -> Result<Booking, LedgerError> {
        self.record(LedgerCall::Cancel { id: id.clone() });
        let failed = take(&mut self.faults().failing_cancels);
        if failed {
            return Err(LedgerError::Unavailable("injected cancel failure".into()));
        }
        self.ledger.cancel(id).await
    }

    async fn get(&self, id: &BookingId) -> Result<Booking, LedgerError> {
        self.record(LedgerCall::Get { id: id.clone() });
        self.ledger.get(id).await
    }

    async fn live_for_slot(&self, slot_id: &SlotId) -> Result<Option<Booking>, LedgerError> {
        self.record(LedgerCall::LiveForSlot {
            slot_id: slot_id.clone(),
        });
        self.reads_failing()?;
        self.ledger.live_for_slot(slot_id).await
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        order: BookingOrder,
    ) -> Result<Vec<Booking>, LedgerError> {
        self.record(LedgerCall::List);
        self.reads_failing()?;
        self.ledger.list(filter, order).await
    }

    async fn counts(&self) -> Result<BookingCounts, LedgerError> {
        self.record(LedgerCall::Counts);
        self.ledger.counts().await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
