// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake slot store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    DurableSlotStore, PublishReport, RequestedInterval, SlotStore, SlotStoreError, Transition,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sb_core::{FakeClock, SequentialIdGen, Slot, SlotId, SlotStatus};
use sb_storage::SlotCounts;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded slot store call
#[derive(Debug, Clone, PartialEq)]
pub enum SlotCall {
    Publish {
        mentor_id: String,
        count: usize,
    },
    Get {
        id: SlotId,
    },
    ListOpen {
        mentor_id: String,
        date: NaiveDate,
    },
    ListByStatus {
        status: SlotStatus,
    },
    TransitionIf {
        id: SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    },
    Counts,
}

type Edge = (SlotStatus, SlotStatus);

#[derive(Default)]
struct Faults {
    /// Remaining failures per edge; nothing is applied
    failing: HashMap<Edge, u32>,
    /// Remaining lost acks per edge; the change is applied, the caller sees an error
    lost_acks: HashMap<Edge, u32>,
    transition_delay: Option<Duration>,
    fail_gets: bool,
}

fn take(budget: &mut HashMap<Edge, u32>, edge: Edge) -> bool {
    match budget.get_mut(&edge) {
        Some(n) if *n > 0 => {
            *n -= 1;
            true
        }
        _ => false,
    }
}

/// Fake slot store with scripted faults
///
/// Real CAS semantics come from an in-memory [`DurableSlotStore`].
#[derive(Clone)]
pub struct FakeSlotStore {
    store: DurableSlotStore<FakeClock, SequentialIdGen>,
    faults: Arc<Mutex<Faults>>,
    calls: Arc<Mutex<Vec<SlotCall>>>,
}

impl Default for FakeSlotStore {
    fn default() -> Self {
        Self::new(FakeClock::new())
    }
}

impl FakeSlotStore {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            store: DurableSlotStore::in_memory(clock, SequentialIdGen::new("slot")),
            faults: Arc::new(Mutex::new(Faults::default())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SlotCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded conditional transitions, in call order
    pub fn transitions(&self) -> Vec<(SlotId, SlotStatus, SlotStatus)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SlotCall::TransitionIf { id, expected, new } => Some((id, expected, new)),
                _ => None,
            })
            .collect()
    }

    /// Fail the next `times` transitions along `from -> to` without applying them
    pub fn fail_transitions(&self, from: SlotStatus, to: SlotStatus, times: u32) {
        self.faults().failing.insert((from, to), times);
    }

    /// Apply the next `times` transitions along `from -> to` but report failure
    pub fn lose_transition_acks(&self, from: SlotStatus, to: SlotStatus, times: u32) {
        self.faults().lost_acks.insert((from, to), times);
    }

    /// Sleep before every transition
    pub fn set_transition_delay(&self, delay: Option<Duration>) {
        self.faults().transition_delay = delay;
    }

    pub fn set_fail_gets(&self, fail: bool) {
        self.faults().fail_gets = fail;
    }

    /// Put a slot into `status` through legal edges, bypassing faults
    pub async fn force_status(&self, id: &SlotId, status: SlotStatus) {
        let Ok(slot) = self.store.get(id).await else {
            return;
        };
        let path = match (slot.status, status) {
            (from, to) if from == to => vec![],
            (SlotStatus::Booked, SlotStatus::Held) => vec![
                (SlotStatus::Booked, SlotStatus::Open),
                (SlotStatus::Open, SlotStatus::Held),
            ],
            edge => vec![edge],
        };
        for (from, to) in path {
            let _ = self.store.transition_if(id, from, to).await;
        }
    }

    /// Publish one slot, bypassing call recording
    pub async fn seed(&self, mentor_id: &str, interval: RequestedInterval) -> Option<Slot> {
        let report = self.store.publish(mentor_id, &[interval]).await.ok()?;
        report.created.into_iter().next()
    }

    /// Read a slot, bypassing faults and call recording
    pub async fn peek(&self, id: &SlotId) -> Option<Slot> {
        self.store.get(id).await.ok()
    }

    fn record(&self, call: SlotCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SlotStore for FakeSlotStore {
    async fn publish(
        &self,
        mentor_id: &str,
        intervals: &[RequestedInterval],
    ) -> Result<PublishReport, SlotStoreError> {
        self.record(SlotCall::Publish {
            mentor_id: mentor_id.to_string(),
            count: intervals.len(),
        });
        self.store.publish(mentor_id, intervals).await
    }

    async fn get(&self, id: &SlotId) -> Result<Slot, SlotStoreError> {
        self.record(SlotCall::Get { id: id.clone() });
        let fail = self.faults().fail_gets;
        if fail {
            return Err(SlotStoreError::Unavailable("injected get failure".into()));
        }
        self.store.get(id).await
    }

    async fn list_open(
        &self,
        mentor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotStoreError> {
        self.record(SlotCall::ListOpen {
            mentor_id: mentor_id.to_string(),
            date,
        });
        self.store.list_open(mentor_id, date).await
    }

    async fn list_by_status(&self, status: SlotStatus) -> Result<Vec<Slot>, SlotStoreError> {
        self.record(SlotCall::ListByStatus { status });
        self.store.list_by_status(status).await
    }

    async fn transition_if(
        &self,
        id: &SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<Transition, SlotStoreError> {
        self.record(SlotCall::TransitionIf {
            id: id.clone(),
            expected,
            new,
        });

        let delay = self.faults().transition_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let edge = (expected, new);
        let failed = take(&mut self.faults().failing, edge);
        if failed {
            return Err(SlotStoreError::Unavailable("injected transition failure".into()));
        }
        let result = self.store.transition_if(id, expected, new).await?;
        let lost = take(&mut self.faults().lost_acks, edge);
        if lost {
            return Err(SlotStoreError::Unavailable("injected lost ack".into()));
        }
        Ok(result)
    }

    async fn counts(&self) -> Result<SlotCounts, SlotStoreError> {
        self.record(SlotCall::Counts);
        self.store.counts().await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
