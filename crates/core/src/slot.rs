// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slot records and the slot status state machine
//!
//! A slot is a mentor-published UTC interval. Its status only ever changes
//! through a conditional transition (`expected -> new`), and every applied
//! transition bumps `version`.

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unique identifier for a slot
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub String);

impl SlotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Slot status
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotStatus {
    /// Bookable
    Open,
    /// Reserved by an in-flight booking attempt
    Held,
    /// Referenced by a confirmed booking
    Booked,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 3] = [SlotStatus::Open, SlotStatus::Held, SlotStatus::Booked];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Open => "OPEN",
            SlotStatus::Held => "HELD",
            SlotStatus::Booked => "BOOKED",
        }
    }

    /// Whether `self -> next` is a legal edge.
    ///
    /// `OPEN -> BOOKED` is legal so the reconciler can repair a slot whose
    /// booking landed after its hold was released. `BOOKED -> HELD` and
    /// self-edges are never legal.
    pub fn can_transition_to(self, next: SlotStatus) -> bool {
        use SlotStatus::*;
        matches!(
            (self, next),
            (Open, Held) | (Held, Booked) | (Held, Open) | (Booked, Open) | (Open, Booked)
        )
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(SlotStatus::Open),
            "HELD" => Ok(SlotStatus::Held),
            "BOOKED" => Ok(SlotStatus::Booked),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

/// A half-open UTC interval `[start, end)` with `end > start`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether the interval intersects `[from, to)`
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && self.end > from
    }
}

/// The UTC day window `[date 00:00Z, date+1 00:00Z)`
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    (start, start + chrono::Duration::days(1))
}

/// A mentor-published, bookable time interval
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: SlotId,
    pub mentor_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: SlotStatus,
    /// Incremented on every applied transition
    pub version: u64,
    pub created_at: DateTime<Utc>,
    /// When `status` last changed; drives hold timeouts
    pub status_changed_at: DateTime<Utc>,
}

impl Slot {
    /// Create a freshly published, open slot
    pub fn new(
        id: SlotId,
        mentor_id: impl Into<String>,
        interval: Interval,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            mentor_id: mentor_id.into(),
            start: interval.start,
            end: interval.end,
            status: SlotStatus::Open,
            version: 0,
            created_at: now,
            status_changed_at: now,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SlotStatus::Open
    }

    /// How long the slot has been in its current status
    pub fn status_age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.status_changed_at).to_std().unwrap_or_default()
    }

    /// Apply an already-validated status change
    ///
    /// Callers are expected to have compared the current status against the
    /// expected one while holding the owning store's lock.
    pub fn apply_status(&mut self, status: SlotStatus, at: DateTime<Utc>) {
        self.status = status;
        self.version += 1;
        self.status_changed_at = at;
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
