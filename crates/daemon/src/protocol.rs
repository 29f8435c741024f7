// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON bodies and query strings of the HTTP API
//!
//! Field names are camelCase on the wire.

use chrono::NaiveDate;
use sb_adapters::{RejectedInterval, RequestedInterval, UserSummary};
use sb_core::{Booking, BookingFilter, Slot, SlotId, SlotStatus, ValidationError};
use sb_engine::BookRequest;
use sb_storage::{BookingCounts, SlotCounts};
use serde::{Deserialize, Serialize};

/// `POST /slots`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishSlots {
    pub mentor_id: String,
    pub slots: Vec<RequestedInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Published {
    pub created: usize,
    pub slots: Vec<Slot>,
    pub rejected: Vec<RejectedInterval>,
}

/// `GET /slots?mentorId&date`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSlotsQuery {
    pub mentor_id: Option<String>,
    pub date: Option<String>,
}

impl OpenSlotsQuery {
    pub fn validate(self) -> Result<(String, NaiveDate), ValidationError> {
        let mentor_id = required(self.mentor_id, "mentorId")?;
        let date = required(self.date, "date")?;
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.clone()))?;
        Ok((mentor_id, date))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSlots {
    pub mentor_id: String,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// `PATCH /slots/{id}/status`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatus {
    pub status: Option<String>,
    pub expected_status: Option<String>,
}

impl SetStatus {
    /// Both statuses are required: an unconditional write is not offered
    pub fn validate(self) -> Result<(SlotStatus, SlotStatus), ValidationError> {
        let expected = required(self.expected_status, "expectedStatus")?.parse()?;
        let status = required(self.status, "status")?.parse()?;
        Ok((expected, status))
    }
}

/// `POST /bookings`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBooking {
    pub mentee_id: String,
    pub mentor_id: String,
    pub slot_id: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateBooking> for BookRequest {
    fn from(body: CreateBooking) -> Self {
        let mut req = BookRequest::new(body.mentee_id, body.mentor_id, SlotId::new(body.slot_id));
        if let Some(amount) = body.amount {
            req.amount = amount;
        }
        if let Some(currency) = body.currency.filter(|c| !c.trim().is_empty()) {
            req.currency = currency;
        }
        if let Some(notes) = body.notes {
            req.notes = notes;
        }
        req
    }
}

/// `GET /bookings?menteeId&mentorId`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    pub mentee_id: Option<String>,
    pub mentor_id: Option<String>,
}

impl From<BookingsQuery> for BookingFilter {
    fn from(query: BookingsQuery) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        BookingFilter {
            mentee_id: present(query.mentee_id),
            mentor_id: present(query.mentor_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// A booking with its participants' profiles, `null` when unavailable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub mentee: Option<UserSummary>,
    pub mentor: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cancelled {
    pub ok: bool,
}

/// `GET /status`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub uptime_secs: u64,
    pub slots: SlotCounts,
    pub bookings: BookingCounts,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::MissingField { field })
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
