// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background sweep that makes slot status agree with the ledger
//!
//! Every repair is a conditional transition, so a slot that live traffic
//! moved since it was read is skipped rather than overwritten.

use chrono::{DateTime, Utc};
use sb_adapters::{BookingLedger, LedgerError, SlotStore, Transition};
use sb_core::{
    Booking, BookingFilter, BookingOrder, Clock, Event, ReservationError, Slot, SlotId,
    SlotStatus,
};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the reconciler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// How often the daemon runs a tick
    pub interval: Duration,
    /// How long a slot may sit in an intermediate state before repair
    pub hold_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            hold_timeout: Duration::from_secs(60),
        }
    }
}

/// What one tick looked at and did
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// HELD and BOOKED slots examined, plus OPEN slots with a live booking
    pub scanned: usize,
    pub repaired: usize,
    /// Repairs abandoned because the slot or its booking moved
    pub skipped: usize,
    pub failed: usize,
    #[serde(skip)]
    pub events: Vec<Event>,
}

impl ReconcileReport {
    fn record(&mut self, event: Event) {
        event.log();
        self.repaired += 1;
        self.events.push(event);
    }
}

/// Periodic repair of slots left behind by interrupted sagas
#[derive(Clone)]
pub struct Reconciler<S, L, C: Clock> {
    slots: S,
    ledger: L,
    clock: C,
    config: ReconcilerConfig,
}

impl<S, L, C> Reconciler<S, L, C>
where
    S: SlotStore,
    L: BookingLedger,
    C: Clock,
{
    pub fn new(slots: S, ledger: L, clock: C, config: ReconcilerConfig) -> Self {
        Self {
            slots,
            ledger,
            clock,
            config,
        }
    }

    /// Get the tick interval
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Run a single reconcile cycle
    ///
    /// Fails only when the ledger or the slot listing cannot be read; per-slot
    /// failures are counted in the report. All listings are taken before any
    /// repair, so a slot is examined at most once per tick.
    pub async fn tick(&self) -> Result<ReconcileReport, ReservationError> {
        let now = self.clock.now();
        let mut report = ReconcileReport::default();
        let held = self.list(SlotStatus::Held).await?;
        let open = self.list(SlotStatus::Open).await?;
        let booked = self.list(SlotStatus::Booked).await?;
        let live = self.live_bookings().await?;

        for slot in held {
            report.scanned += 1;
            match live.get(&slot.id) {
                Some(booking) => {
                    let reason = format!("booking {} is live", booking.id);
                    self.repair(&mut report, &slot, SlotStatus::Booked, reason, now)
                        .await;
                }
                None if slot.status_age(now) > self.config.hold_timeout => {
                    let reason = "hold expired".to_string();
                    self.repair(&mut report, &slot, SlotStatus::Open, reason, now)
                        .await;
                }
                // In flight
                None => {}
            }
        }

        for slot in open {
            let Some(booking) = live.get(&slot.id) else {
                continue;
            };
            report.scanned += 1;
            if self.aged(booking, now) {
                let reason = format!("booking {} landed after release", booking.id);
                self.repair(&mut report, &slot, SlotStatus::Booked, reason, now)
                    .await;
            }
        }

        for slot in booked {
            report.scanned += 1;
            if !live.contains_key(&slot.id) && slot.status_age(now) > self.config.hold_timeout {
                let reason = "no live booking".to_string();
                self.repair(&mut report, &slot, SlotStatus::Open, reason, now)
                    .await;
            }
        }

        if report.repaired > 0 || report.failed > 0 {
            tracing::info!(
                scanned = report.scanned,
                repaired = report.repaired,
                skipped = report.skipped,
                failed = report.failed,
                "reconcile tick"
            );
        } else {
            tracing::debug!(scanned = report.scanned, "reconcile tick");
        }
        Ok(report)
    }

    fn aged(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        let age = (now - booking.created_at).to_std().unwrap_or_default();
        age > self.config.hold_timeout
    }

    /// Whether the ledger still calls for moving `slot` to `to`
    ///
    /// BOOKED needs a live booking (an aged one when coming from OPEN); OPEN
    /// needs none.
    async fn still_needed(
        &self,
        slot: &Slot,
        to: SlotStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let live = self.ledger.live_for_slot(&slot.id).await?;
        Ok(match (slot.status, to, live) {
            (_, SlotStatus::Open, live) => live.is_none(),
            (SlotStatus::Open, SlotStatus::Booked, Some(booking)) => self.aged(&booking, now),
            (_, SlotStatus::Booked, live) => live.is_some(),
            (_, SlotStatus::Held, _) => false,
        })
    }

    async fn live_bookings(&self) -> Result<HashMap<SlotId, Booking>, ReservationError> {
        let bookings = self
            .ledger
            .list(&BookingFilter::default(), BookingOrder::StartAsc)
            .await
            .map_err(|e| ReservationError::UpstreamUnavailable(e.to_string()))?;
        Ok(bookings
            .into_iter()
            .filter(Booking::is_live)
            .map(|b| (b.slot_id.clone(), b))
            .collect())
    }

    async fn list(&self, status: SlotStatus) -> Result<Vec<Slot>, ReservationError> {
        self.slots
            .list_by_status(status)
            .await
            .map_err(|e| ReservationError::UpstreamUnavailable(e.to_string()))
    }

    async fn repair(
        &self,
        report: &mut ReconcileReport,
        slot: &Slot,
        to: SlotStatus,
        reason: String,
        now: DateTime<Utc>,
    ) {
        match self.still_needed(slot, to, now).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(slot_id = %slot.id, %to, "ledger changed, repair skipped");
                report.skipped += 1;
                return;
            }
            Err(e) => {
                tracing::warn!(slot_id = %slot.id, error = %e, "ledger re-read failed");
                report.failed += 1;
                return;
            }
        }

        match self.slots.transition_if(&slot.id, slot.status, to).await {
            Ok(Transition::Applied(_)) => report.record(Event::SlotRepaired {
                slot_id: slot.id.clone(),
                from: slot.status,
                to,
                reason,
            }),
            Ok(Transition::Conflict { actual }) => {
                tracing::debug!(slot_id = %slot.id, %actual, "slot moved, repair skipped");
                report.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(slot_id = %slot.id, error = %e, "repair failed");
                report.failed += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
