// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed booking ledger

use super::{BookingLedger, LedgerError};
use async_trait::async_trait;
use sb_core::{
    Booking, BookingFilter, BookingId, BookingOrder, Clock, IdGen, LedgerOp, NewBooking, SlotId,
};
use sb_storage::{BookingCounts, BookingTable, CreatePlan, Wal};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

struct Inner {
    table: BookingTable,
    wal: Option<Wal<LedgerOp>>,
}

impl Inner {
    fn commit(&mut self, op: LedgerOp) -> Result<(), LedgerError> {
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&op)?;
        }
        self.table.apply(&op);
        Ok(())
    }
}

/// Booking ledger with a unique live-booking-per-slot index
pub struct DurableBookingLedger<C: Clock, I: IdGen> {
    inner: Arc<Mutex<Inner>>,
    clock: C,
    ids: I,
}

impl<C: Clock, I: IdGen> Clone for DurableBookingLedger<C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: self.clock.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<C: Clock, I: IdGen> DurableBookingLedger<C, I> {
    pub fn in_memory(clock: C, ids: I) -> Self {
        Self::from_parts(BookingTable::default(), None, clock, ids)
    }

    /// Replay the log at `path` and keep appending to it
    pub fn open(path: &Path, clock: C, ids: I) -> Result<Self, LedgerError> {
        let mut table = BookingTable::default();
        let ops = Wal::<LedgerOp>::replay(path)?;
        for op in &ops {
            table.apply(op);
        }
        let wal = Wal::open(path)?;
        tracing::info!(
            path = %path.display(),
            replayed = ops.len(),
            bookings = table.len(),
            "booking ledger opened"
        );
        Ok(Self::from_parts(table, Some(wal), clock, ids))
    }

    fn from_parts(table: BookingTable, wal: Option<Wal<LedgerOp>>, clock: C, ids: I) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { table, wal })),
            clock,
            ids,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<C: Clock, I: IdGen> BookingLedger for DurableBookingLedger<C, I> {
    async fn create(&self, new: NewBooking) -> Result<Booking, LedgerError> {
        new.validate()?;

        let mut inner = self.lock();
        match inner.table.plan_create(&new) {
            CreatePlan::Insert => {
                let booking = new.into_booking(BookingId::new(self.ids.next()), self.clock.now());
                inner.commit(LedgerOp::Create {
                    booking: booking.clone(),
                })?;
                Ok(booking)
            }
            CreatePlan::Replay(existing) => {
                tracing::debug!(booking_id = %existing.id, "create replayed");
                Ok(existing)
            }
            CreatePlan::Conflict(existing) => Err(LedgerError::Conflict {
                slot_id: existing.slot_id,
                existing: existing.id,
            }),
        }
    }

    async fn cancel(&self, id: &BookingId) -> Result<Booking, LedgerError> {
        let mut inner = self.lock();
        let booking = inner
            .table
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        if !booking.is_live() {
            return Ok(booking);
        }
        inner.commit(LedgerOp::Cancel {
            id: id.clone(),
            at: self.clock.now(),
        })?;
        inner
            .table
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    async fn get(&self, id: &BookingId) -> Result<Booking, LedgerError> {
        self.lock()
            .table
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    async fn live_for_slot(&self, slot_id: &SlotId) -> Result<Option<Booking>, LedgerError> {
        Ok(self.lock().table.live_for_slot(slot_id).cloned())
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        order: BookingOrder,
    ) -> Result<Vec<Booking>, LedgerError> {
        Ok(self.lock().table.list(filter, order))
    }

    async fn counts(&self) -> Result<BookingCounts, LedgerError> {
        Ok(self.lock().table.counts())
    }
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
