// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tables materialized from WAL replay
//!
//! Mutations are split in two halves: a `plan_*` method that checks the
//! current row and produces the operation to log, and `apply` that folds a
//! logged operation into the table. Owners hold one lock across plan, append
//! and apply, which is what makes a conditional transition atomic.

use sb_core::{
    Booking, BookingFilter, BookingId, BookingOrder, BookingStatus, LedgerOp, NewBooking, Slot,
    SlotId, SlotOp, SlotStatus,
};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of checking a conditional slot transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionPlan {
    /// The current status matches; log and apply this op
    Apply(SlotOp),
    /// The current status differs from the expected one
    Conflict { actual: SlotStatus },
    /// `expected -> new` is not a legal edge
    Illegal,
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotCounts {
    pub open: usize,
    pub held: usize,
    pub booked: usize,
}

/// Slot registry table
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: HashMap<SlotId, Slot>,
}

impl SlotTable {
    pub fn get(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check `expected -> new` against the current row
    pub fn plan_transition(
        &self,
        id: &SlotId,
        expected: SlotStatus,
        new: SlotStatus,
        at: chrono::DateTime<chrono::Utc>,
    ) -> TransitionPlan {
        let Some(slot) = self.slots.get(id) else {
            return TransitionPlan::NotFound;
        };
        if !expected.can_transition_to(new) {
            return TransitionPlan::Illegal;
        }
        if slot.status != expected {
            return TransitionPlan::Conflict {
                actual: slot.status,
            };
        }
        TransitionPlan::Apply(SlotOp::Transition {
            id: id.clone(),
            from: expected,
            to: new,
            at,
        })
    }

    /// Apply an operation to update the table
    pub fn apply(&mut self, op: &SlotOp) {
        match op {
            SlotOp::Publish { slot } => {
                self.slots.insert(slot.id.clone(), slot.clone());
            }

            SlotOp::Transition { id, from, to, at } => {
                if let Some(slot) = self.slots.get_mut(id) {
                    if slot.status == *from {
                        slot.apply_status(*to, *at);
                    } else {
                        // Only reachable with a hand-edited log
                        tracing::warn!(
                            slot_id = %id,
                            logged_from = %from,
                            actual = %slot.status,
                            "ignoring out-of-order transition"
                        );
                    }
                }
            }
        }
    }

    /// Open slots of `mentor_id` overlapping `[from, to)`, earliest first
    pub fn open_in_window(
        &self,
        mentor_id: &str,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .slots
            .values()
            .filter(|s| s.mentor_id == mentor_id && s.is_open() && s.interval().overlaps(from, to))
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        slots
    }

    pub fn with_status(&self, status: SlotStatus) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .slots
            .values()
            .filter(|s| s.status == status)
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.status_changed_at.cmp(&b.status_changed_at));
        slots
    }

    pub fn counts(&self) -> SlotCounts {
        let mut counts = SlotCounts::default();
        for slot in self.slots.values() {
            match slot.status {
                SlotStatus::Open => counts.open += 1,
                SlotStatus::Held => counts.held += 1,
                SlotStatus::Booked => counts.booked += 1,
            }
        }
        counts
    }
}

/// Outcome of checking a booking insert against the live-by-slot index
#[derive(Debug, Clone, PartialEq)]
pub enum CreatePlan {
    /// No live booking for the slot; write a new row
    Insert,
    /// A live booking with the same idempotency key exists; hand it back
    Replay(Booking),
    /// Another live booking owns the slot
    Conflict(Booking),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BookingCounts {
    pub confirmed: usize,
    pub cancelled: usize,
}

/// Booking ledger table with a unique index on live bookings per slot
#[derive(Debug, Default)]
pub struct BookingTable {
    bookings: HashMap<BookingId, Booking>,
    live_by_slot: HashMap<SlotId, BookingId>,
}

impl BookingTable {
    pub fn get(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.get(id)
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn live_for_slot(&self, slot_id: &SlotId) -> Option<&Booking> {
        self.live_by_slot
            .get(slot_id)
            .and_then(|id| self.bookings.get(id))
    }

    pub fn plan_create(&self, new: &NewBooking) -> CreatePlan {
        match self.live_for_slot(&new.slot_id) {
            None => CreatePlan::Insert,
            Some(existing) if existing.idempotency_key == new.idempotency_key => {
                CreatePlan::Replay(existing.clone())
            }
            Some(existing) => CreatePlan::Conflict(existing.clone()),
        }
    }

    /// Apply an operation to update the table
    pub fn apply(&mut self, op: &LedgerOp) {
        match op {
            LedgerOp::Create { booking } => {
                if booking.is_live() {
                    if let Some(previous) = self
                        .live_by_slot
                        .insert(booking.slot_id.clone(), booking.id.clone())
                    {
                        if previous != booking.id {
                            tracing::warn!(
                                slot_id = %booking.slot_id,
                                previous = %previous,
                                booking_id = %booking.id,
                                "live index replaced"
                            );
                        }
                    }
                }
                self.bookings.insert(booking.id.clone(), booking.clone());
            }

            LedgerOp::Cancel { id, at } => {
                if let Some(booking) = self.bookings.get_mut(id) {
                    if booking.status == BookingStatus::Confirmed {
                        booking.status = BookingStatus::Cancelled;
                        booking.cancelled_at = Some(*at);
                    }
                    if self.live_by_slot.get(&booking.slot_id) == Some(id) {
                        self.live_by_slot.remove(&booking.slot_id);
                    }
                }
            }
        }
    }

    pub fn list(&self, filter: &BookingFilter, order: BookingOrder) -> Vec<Booking> {
        let mut items: Vec<Booking> = self
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        order.sort(&mut items);
        items
    }

    pub fn counts(&self) -> BookingCounts {
        let mut counts = BookingCounts::default();
        for booking in self.bookings.values() {
            match booking.status {
                BookingStatus::Confirmed => counts.confirmed += 1,
                BookingStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
