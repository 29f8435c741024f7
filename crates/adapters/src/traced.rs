// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrappers for consistent observability

use crate::ledger::{BookingLedger, LedgerError};
use crate::slots::{PublishReport, RequestedInterval, SlotStore, SlotStoreError, Transition};
use async_trait::async_trait;
use chrono::NaiveDate;
use sb_core::{
    Booking, BookingFilter, BookingId, BookingOrder, NewBooking, Slot, SlotId, SlotStatus,
};
use sb_storage::{BookingCounts, SlotCounts};
use tracing::Instrument;

/// Wrapper that adds tracing to any SlotStore
#[derive(Clone)]
pub struct TracedSlotStore<S> {
    inner: S,
}

impl<S> TracedSlotStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SlotStore> SlotStore for TracedSlotStore<S> {
    async fn publish(
        &self,
        mentor_id: &str,
        intervals: &[RequestedInterval],
    ) -> Result<PublishReport, SlotStoreError> {
        let span = tracing::info_span!("slots.publish", mentor_id);
        async {
            tracing::info!(requested = intervals.len(), "publishing");
            let start = std::time::Instant::now();
            let result = self.inner.publish(mentor_id, intervals).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(report) => tracing::info!(
                    created = report.created.len(),
                    rejected = report.rejected.len(),
                    elapsed_ms,
                    "published"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "publish failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get(&self, id: &SlotId) -> Result<Slot, SlotStoreError> {
        let result = self.inner.get(id).await;
        tracing::trace!(
            slot_id = %id,
            status = ?result.as_ref().map(|s| s.status).ok(),
            "got slot"
        );
        result
    }

    async fn list_open(
        &self,
        mentor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotStoreError> {
        let result = self.inner.list_open(mentor_id, date).await;
        tracing::debug!(
            mentor_id,
            %date,
            count = result.as_ref().map(|v| v.len()).ok(),
            "listed open slots"
        );
        result
    }

    async fn list_by_status(&self, status: SlotStatus) -> Result<Vec<Slot>, SlotStoreError> {
        let result = self.inner.list_by_status(status).await;
        tracing::trace!(
            %status,
            count = result.as_ref().map(|v| v.len()).ok(),
            "listed slots"
        );
        result
    }

    async fn transition_if(
        &self,
        id: &SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<Transition, SlotStoreError> {
        let span = tracing::info_span!(
            "slots.transition_if",
            slot_id = %id,
            %expected,
            %new
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.transition_if(id, expected, new).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(Transition::Applied(slot)) => {
                    tracing::info!(version = slot.version, elapsed_ms, "applied")
                }
                // Conflicts are normal under contention
                Ok(Transition::Conflict { actual }) => {
                    tracing::debug!(%actual, elapsed_ms, "conflict")
                }
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "transition failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn counts(&self) -> Result<SlotCounts, SlotStoreError> {
        self.inner.counts().await
    }
}

/// Wrapper that adds tracing to any BookingLedger
#[derive(Clone)]
pub struct TracedBookingLedger<L> {
    inner: L,
}

impl<L> TracedBookingLedger<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L: BookingLedger> BookingLedger for TracedBookingLedger<L> {
    async fn create(&self, new: NewBooking) -> Result<Booking, LedgerError> {
        let span = tracing::info_span!(
            "ledger.create",
            slot_id = %new.slot_id,
            mentee_id = %new.mentee_id,
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create(new).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(booking) => {
                    tracing::info!(booking_id = %booking.id, elapsed_ms, "booking written")
                }
                Err(LedgerError::Conflict { existing, .. }) => {
                    tracing::warn!(%existing, elapsed_ms, "slot already booked")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn cancel(&self, id: &BookingId) -> Result<Booking, LedgerError> {
        let span = tracing::info_span!("ledger.cancel", booking_id = %id);
        async {
            let result = self.inner.cancel(id).await;
            match &result {
                Ok(booking) => tracing::info!(slot_id = %booking.slot_id, "cancelled"),
                Err(LedgerError::NotFound(_)) => tracing::debug!("unknown booking"),
                Err(e) => tracing::error!(error = %e, "cancel failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get(&self, id: &BookingId) -> Result<Booking, LedgerError> {
        self.inner.get(id).await
    }

    async fn live_for_slot(&self, slot_id: &SlotId) -> Result<Option<Booking>, LedgerError> {
        let result = self.inner.live_for_slot(slot_id).await;
        tracing::trace!(
            %slot_id,
            live = ?result.as_ref().ok().map(|b| b.as_ref().map(|b| &b.id)),
            "checked live booking"
        );
        result
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        order: BookingOrder,
    ) -> Result<Vec<Booking>, LedgerError> {
        let result = self.inner.list(filter, order).await;
        tracing::debug!(
            mentee_id = ?filter.mentee_id,
            mentor_id = ?filter.mentor_id,
            ?order,
            count = result.as_ref().map(|v| v.len()).ok(),
            "listed bookings"
        );
        result
    }

    async fn counts(&self) -> Result<BookingCounts, LedgerError> {
        self.inner.counts().await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
