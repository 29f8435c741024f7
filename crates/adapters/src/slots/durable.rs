// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed slot store

use super::{
    PublishReport, RejectedInterval, RequestedInterval, SlotStore, SlotStoreError, Transition,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sb_core::{
    day_window, Clock, IdGen, Interval, Slot, SlotId, SlotOp, SlotStatus, ValidationError,
};
use sb_storage::{SlotCounts, SlotTable, TransitionPlan, Wal};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

struct Inner {
    table: SlotTable,
    wal: Option<Wal<SlotOp>>,
    /// Appends allowed before the log starts failing
    #[cfg(test)]
    appends_left: Option<usize>,
}

impl Inner {
    /// Log then apply. Nothing is applied if the log write fails.
    fn commit(&mut self, op: SlotOp) -> Result<(), SlotStoreError> {
        self.spend_append()?;
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&op)?;
        }
        self.table.apply(&op);
        Ok(())
    }

    #[cfg(test)]
    fn spend_append(&mut self) -> Result<(), SlotStoreError> {
        match self.appends_left.as_mut() {
            Some(0) => Err(SlotStoreError::Unavailable("log full".into())),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    #[cfg(not(test))]
    fn spend_append(&mut self) -> Result<(), SlotStoreError> {
        Ok(())
    }
}

/// Slot store holding the table in memory and logging every mutation
///
/// The whole plan/append/apply sequence of a transition runs under one lock,
/// so two callers racing on the same slot cannot both see `expected`.
pub struct DurableSlotStore<C: Clock, I: IdGen> {
    inner: Arc<Mutex<Inner>>,
    clock: C,
    ids: I,
}

impl<C: Clock, I: IdGen> Clone for DurableSlotStore<C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: self.clock.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<C: Clock, I: IdGen> DurableSlotStore<C, I> {
    /// Volatile store with no log
    pub fn in_memory(clock: C, ids: I) -> Self {
        Self::from_parts(SlotTable::default(), None, clock, ids)
    }

    /// Replay the log at `path` and keep appending to it
    pub fn open(path: &Path, clock: C, ids: I) -> Result<Self, SlotStoreError> {
        let mut table = SlotTable::default();
        let ops = Wal::<SlotOp>::replay(path)?;
        let replayed = ops.len();
        for op in &ops {
            table.apply(op);
        }
        let wal = Wal::open(path)?;
        tracing::info!(path = %path.display(), replayed, slots = table.len(), "slot store opened");
        Ok(Self::from_parts(table, Some(wal), clock, ids))
    }

    fn from_parts(table: SlotTable, wal: Option<Wal<SlotOp>>, clock: C, ids: I) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                table,
                wal,
                #[cfg(test)]
                appends_left: None,
            })),
            clock,
            ids,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<C: Clock, I: IdGen> SlotStore for DurableSlotStore<C, I> {
    async fn publish(
        &self,
        mentor_id: &str,
        intervals: &[RequestedInterval],
    ) -> Result<PublishReport, SlotStoreError> {
        if mentor_id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "mentorId" }.into());
        }

        let now = self.clock.now();
        let mut report = PublishReport::default();
        let mut inner = self.lock();
        for (index, requested) in intervals.iter().enumerate() {
            let interval = match Interval::new(requested.start, requested.end) {
                Ok(interval) => interval,
                Err(e) => {
                    report.rejected.push(RejectedInterval {
                        index,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            let slot = Slot::new(SlotId::new(self.ids.next()), mentor_id, interval, now);
            if let Err(e) = inner.commit(SlotOp::Publish { slot: slot.clone() }) {
                if report.created.is_empty() {
                    return Err(e);
                }
                // Keep what is already durable; the rest of the batch is refused
                tracing::warn!(mentor_id, index, error = %e, "publish stopped early");
                report.rejected.extend((index..intervals.len()).map(|index| RejectedInterval {
                    index,
                    error: e.to_string(),
                }));
                break;
            }
            report.created.push(slot);
        }
        Ok(report)
    }

    async fn get(&self, id: &SlotId) -> Result<Slot, SlotStoreError> {
        self.lock()
            .table
            .get(id)
            .cloned()
            .ok_or_else(|| SlotStoreError::NotFound(id.clone()))
    }

    async fn list_open(
        &self,
        mentor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotStoreError> {
        let (from, to) = day_window(date);
        Ok(self.lock().table.open_in_window(mentor_id, from, to))
    }

    async fn list_by_status(&self, status: SlotStatus) -> Result<Vec<Slot>, SlotStoreError> {
        Ok(self.lock().table.with_status(status))
    }

    async fn transition_if(
        &self,
        id: &SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<Transition, SlotStoreError> {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.table.plan_transition(id, expected, new, now) {
            TransitionPlan::Apply(op) => {
                inner.commit(op)?;
                let slot = inner
                    .table
                    .get(id)
                    .cloned()
                    .ok_or_else(|| SlotStoreError::NotFound(id.clone()))?;
                Ok(Transition::Applied(slot))
            }
            TransitionPlan::Conflict { actual } => Ok(Transition::Conflict { actual }),
            TransitionPlan::Illegal => Err(ValidationError::IllegalTransition {
                from: expected,
                to: new,
            }
            .into()),
            TransitionPlan::NotFound => Err(SlotStoreError::NotFound(id.clone())),
        }
    }

    async fn counts(&self) -> Result<SlotCounts, SlotStoreError> {
        Ok(self.lock().table.counts())
    }
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
