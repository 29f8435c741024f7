// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking records
//!
//! A booking copies the slot's interval at creation time. At most one
//! confirmed booking may reference a slot; cancelled rows are kept as history.

use crate::error::ValidationError;
use crate::slot::{Slot, SlotId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Unique identifier for a booking
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deduplicates ledger writes that are retried for the same attempt
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(pub String);

impl IdempotencyKey {
    /// Key for a mentee's attempt on a slot
    pub fn for_attempt(slot_id: &SlotId, mentee_id: &str) -> Self {
        Self(format!("{}:{}", slot_id, mentee_id))
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A mentee's reservation of a slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub mentee_id: String,
    pub mentor_id: String,
    pub slot_id: SlotId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub amount: f64,
    pub currency: String,
    pub notes: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub idempotency_key: IdempotencyKey,
}

impl Booking {
    pub fn is_live(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Everything the ledger needs to write a booking row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub mentee_id: String,
    pub mentor_id: String,
    pub slot_id: SlotId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub amount: f64,
    pub currency: String,
    pub notes: String,
    pub idempotency_key: IdempotencyKey,
}

impl NewBooking {
    /// Build a booking request for `slot`, copying its interval
    pub fn for_slot(
        slot: &Slot,
        mentee_id: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        let mentee_id = mentee_id.into();
        Self {
            idempotency_key: IdempotencyKey::for_attempt(&slot.id, &mentee_id),
            mentee_id,
            mentor_id: slot.mentor_id.clone(),
            slot_id: slot.id.clone(),
            start: slot.start,
            end: slot.end,
            amount,
            currency: currency.into(),
            notes: notes.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mentee_id.is_empty() {
            return Err(ValidationError::MissingField { field: "menteeId" });
        }
        if self.mentor_id.is_empty() {
            return Err(ValidationError::MissingField { field: "mentorId" });
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount);
        }
        if self.end <= self.start {
            return Err(ValidationError::EmptyInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Materialize the confirmed row
    pub fn into_booking(self, id: BookingId, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            mentee_id: self.mentee_id,
            mentor_id: self.mentor_id,
            slot_id: self.slot_id,
            start: self.start,
            end: self.end,
            amount: self.amount,
            currency: self.currency,
            notes: self.notes,
            status: BookingStatus::Confirmed,
            created_at,
            cancelled_at: None,
            idempotency_key: self.idempotency_key,
        }
    }
}

/// Optional mentee/mentor filter for ledger reads
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub mentee_id: Option<String>,
    pub mentor_id: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        let mentee_ok = match &self.mentee_id {
            Some(m) => &booking.mentee_id == m,
            None => true,
        };
        let mentor_ok = match &self.mentor_id {
            Some(m) => &booking.mentor_id == m,
            None => true,
        };
        mentee_ok && mentor_ok
    }
}

/// Read ordering for ledger listings
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BookingOrder {
    /// Schedule view
    #[default]
    StartAsc,
    /// Historical view, newest first
    CreatedDesc,
}

impl BookingOrder {
    pub fn sort(&self, bookings: &mut [Booking]) {
        match self {
            BookingOrder::StartAsc => bookings.sort_by(|a, b| a.start.cmp(&b.start)),
            BookingOrder::CreatedDesc => bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

#[cfg(test)]
#[path = "booking_tests.rs"]
mod tests;
