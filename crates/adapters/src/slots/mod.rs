// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slot registry adapters

mod durable;

pub use durable::DurableSlotStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSlotStore, SlotCall};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sb_core::{Slot, SlotId, SlotStatus, ValidationError};
use sb_storage::{SlotCounts, WalError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from slot store operations
#[derive(Debug, Error)]
pub enum SlotStoreError {
    #[error("slot not found: {0}")]
    NotFound(SlotId),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("slot store unavailable: {0}")]
    Unavailable(String),
}

impl From<WalError> for SlotStoreError {
    fn from(e: WalError) -> Self {
        SlotStoreError::Unavailable(e.to_string())
    }
}

/// Result of a conditional transition
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The expected status matched; the slot now has the new status
    Applied(Slot),
    /// The expected status did not match; nothing was written
    Conflict { actual: SlotStatus },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}

/// An interval as submitted by a mentor, not yet validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedInterval {
    /// Position in the submitted batch
    pub index: usize,
    pub error: String,
}

/// Per-interval outcome of a publish
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishReport {
    pub created: Vec<Slot>,
    pub rejected: Vec<RejectedInterval>,
}

/// Owner of slot records and their status state machine
///
/// `transition_if` is the only way to change a slot's status.
#[async_trait]
pub trait SlotStore: Clone + Send + Sync + 'static {
    /// Create each valid interval as an open slot
    ///
    /// A malformed interval only fails itself; the report says which ones.
    async fn publish(
        &self,
        mentor_id: &str,
        intervals: &[RequestedInterval],
    ) -> Result<PublishReport, SlotStoreError>;

    async fn get(&self, id: &SlotId) -> Result<Slot, SlotStoreError>;

    /// Open slots of a mentor overlapping the UTC day, earliest first
    async fn list_open(&self, mentor_id: &str, date: NaiveDate)
        -> Result<Vec<Slot>, SlotStoreError>;

    /// All slots in a status, least recently changed first
    async fn list_by_status(&self, status: SlotStatus) -> Result<Vec<Slot>, SlotStoreError>;

    /// Atomically move the slot from `expected` to `new`
    async fn transition_if(
        &self,
        id: &SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<Transition, SlotStoreError>;

    async fn counts(&self) -> Result<SlotCounts, SlotStoreError>;
}
