// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation saga
//!
//! A booking attempt holds the slot, writes the ledger, then confirms the
//! slot. Each step is a separate call to a store that can fail or time out,
//! so every failure edge either compensates the hold or leaves the slot for
//! the reconciler. The ledger decides who owns a slot.

use crate::error::CallError;
use sb_adapters::{BookingLedger, LedgerError, SlotStore, SlotStoreError, Transition};
use sb_core::booking::DEFAULT_CURRENCY;
use sb_core::{
    Booking, BookingId, Event, NewBooking, ReservationError, RetryPolicy, SagaPhase, SagaTrace,
    Slot, SlotId, SlotStatus, ValidationError,
};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Coordinator tuning
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorConfig {
    /// Upper bound for a single store call
    pub call_timeout: Duration,
    /// Backoff for retryable store calls
    pub retry: RetryPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }
}

/// A mentee's request to book a slot
#[derive(Clone, Debug, PartialEq)]
pub struct BookRequest {
    pub mentee_id: String,
    pub mentor_id: String,
    pub slot_id: SlotId,
    pub amount: f64,
    pub currency: String,
    pub notes: String,
}

impl BookRequest {
    pub fn new(
        mentee_id: impl Into<String>,
        mentor_id: impl Into<String>,
        slot_id: SlotId,
    ) -> Self {
        Self {
            mentee_id: mentee_id.into(),
            mentor_id: mentor_id.into(),
            slot_id,
            amount: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            notes: String::new(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("menteeId", self.mentee_id.as_str()),
            ("mentorId", self.mentor_id.as_str()),
            ("slotId", self.slot_id.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }
        Ok(())
    }
}

/// Everything a finished saga produced
#[derive(Debug)]
pub struct SagaOutcome {
    pub result: Result<Booking, ReservationError>,
    pub trace: SagaTrace,
    pub events: Vec<Event>,
}

struct Saga {
    trace: SagaTrace,
    events: Vec<Event>,
}

impl Saga {
    fn new(req: &BookRequest) -> Self {
        Self {
            trace: SagaTrace::new(req.slot_id.clone(), req.mentee_id.clone()),
            events: Vec::new(),
        }
    }

    fn slot_id(&self) -> SlotId {
        self.trace.slot_id.clone()
    }

    fn advance(&mut self, phase: SagaPhase) {
        self.trace.advance(phase);
    }

    fn emit(&mut self, event: Event) {
        event.log();
        self.events.push(event);
    }

    /// Give up and leave the slot for the reconciler
    fn stuck(&mut self, reason: String) {
        let phase = self.trace.phase();
        self.trace.advance(SagaPhase::Stuck);
        self.emit(Event::SagaStuck {
            slot_id: self.slot_id(),
            phase,
            reason,
        });
    }

    fn finish(self, result: Result<Booking, ReservationError>) -> SagaOutcome {
        SagaOutcome {
            result,
            trace: self.trace,
            events: self.events,
        }
    }
}

fn unavailable(slot_id: &SlotId) -> ReservationError {
    ReservationError::SlotUnavailable {
        slot_id: slot_id.clone(),
    }
}

/// Orchestrates booking and cancellation across the slot store and the ledger
#[derive(Clone)]
pub struct ReservationCoordinator<S, L> {
    slots: S,
    ledger: L,
    config: CoordinatorConfig,
}

impl<S, L> ReservationCoordinator<S, L>
where
    S: SlotStore,
    L: BookingLedger,
{
    pub fn new(slots: S, ledger: L, config: CoordinatorConfig) -> Self {
        Self {
            slots,
            ledger,
            config,
        }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Book a slot for a mentee
    pub async fn book(&self, req: BookRequest) -> Result<Booking, ReservationError> {
        self.book_traced(req).await.result
    }

    /// Book a slot and return the saga's phase trace and events
    ///
    /// The saga runs on its own task: dropping this future does not abandon
    /// a hold that was already won.
    pub async fn book_traced(&self, req: BookRequest) -> SagaOutcome {
        let this = self.clone();
        let trace = SagaTrace::new(req.slot_id.clone(), req.mentee_id.clone());
        match tokio::spawn(async move { this.run_book(req).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "saga task failed");
                SagaOutcome {
                    result: Err(ReservationError::UpstreamUnavailable(format!(
                        "saga task failed: {}",
                        e
                    ))),
                    trace,
                    events: Vec::new(),
                }
            }
        }
    }

    /// Cancel a booking and release its slot
    ///
    /// Cancelling a cancelled booking returns it unchanged.
    pub async fn cancel(&self, id: &BookingId) -> Result<Booking, ReservationError> {
        let this = self.clone();
        let id = id.clone();
        tokio::spawn(async move { this.run_cancel(id).await })
            .await
            .map_err(|e| {
                ReservationError::UpstreamUnavailable(format!("cancel task failed: {}", e))
            })?
    }

    async fn run_book(&self, req: BookRequest) -> SagaOutcome {
        let span = tracing::info_span!(
            "saga.book",
            slot_id = %req.slot_id,
            mentee_id = %req.mentee_id
        );
        let mut saga = Saga::new(&req);
        let started = Instant::now();
        let result = self.drive(&mut saga, req).instrument(span.clone()).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let phase = saga.trace.phase();
        span.in_scope(|| match &result {
            Ok(booking) => tracing::info!(booking_id = %booking.id, %phase, elapsed_ms, "booked"),
            Err(e) => tracing::info!(%phase, elapsed_ms, error = %e, "booking failed"),
        });
        saga.finish(result)
    }

    async fn drive(
        &self,
        saga: &mut Saga,
        req: BookRequest,
    ) -> Result<Booking, ReservationError> {
        req.validate()?;

        // 1. The slot must exist and belong to the mentor
        let slot = match self.read_slot(&req.slot_id).await {
            Ok(slot) => slot,
            Err(CallError::Failed(SlotStoreError::NotFound(_))) => {
                return Err(unavailable(&req.slot_id))
            }
            Err(e) => return Err(e.into_reservation(&req.slot_id)),
        };
        if slot.mentor_id != req.mentor_id {
            tracing::debug!(owner = %slot.mentor_id, "mentor mismatch");
            return Err(unavailable(&slot.id));
        }

        // 2. Hold. Losing this CAS is the normal way to lose a race.
        saga.advance(SagaPhase::Holding);
        let hold = self
            .call(self.slots.transition_if(&slot.id, SlotStatus::Open, SlotStatus::Held))
            .await;
        match hold {
            Ok(Transition::Applied(_)) => {
                saga.advance(SagaPhase::HeldOk);
                saga.emit(Event::SlotHeld {
                    slot_id: slot.id.clone(),
                    mentee_id: req.mentee_id.clone(),
                });
            }
            Ok(Transition::Conflict { actual }) => {
                tracing::debug!(%actual, "slot taken");
                saga.advance(SagaPhase::RolledBack);
                return Err(unavailable(&slot.id));
            }
            Err(CallError::Failed(SlotStoreError::NotFound(_))) => {
                saga.advance(SagaPhase::RolledBack);
                return Err(unavailable(&slot.id));
            }
            Err(CallError::Failed(SlotStoreError::Invalid(e))) => {
                saga.advance(SagaPhase::RolledBack);
                return Err(e.into());
            }
            Err(e) => {
                // The hold may have landed; the reconciler will release it
                saga.stuck(format!("hold outcome unknown: {}", e));
                return Err(e.into_reservation(&slot.id));
            }
        }

        // 3. Ledger write, idempotent per (slot, mentee)
        let new = NewBooking::for_slot(&slot, req.mentee_id, req.amount, req.currency, req.notes);
        let booking = match self.write_ledger(&new).await {
            Ok(booking) => booking,
            Err(CallError::Failed(LedgerError::Conflict { existing, .. })) => {
                saga.emit(Event::InconsistentState {
                    slot_id: slot.id.clone(),
                    detail: format!("slot was open but booking {} is live", existing),
                });
                saga.stuck("ledger conflict, slot left held".to_string());
                return Err(unavailable(&slot.id));
            }
            Err(CallError::Failed(LedgerError::Invalid(e))) => {
                self.compensate(saga, &slot.id, e.to_string()).await;
                return Err(e.into());
            }
            Err(e) => match self.find_landed(&new).await {
                Some(booking) => booking,
                None => {
                    let reason = e.to_string();
                    self.compensate(saga, &slot.id, reason).await;
                    return Err(e.into_reservation());
                }
            },
        };
        saga.advance(SagaPhase::LedgerWritten);
        saga.emit(Event::BookingCreated {
            booking_id: booking.id.clone(),
            slot_id: slot.id.clone(),
        });

        // 4. Confirm. The booking stands even if this fails.
        saga.advance(SagaPhase::Confirming);
        match self.confirm(&slot.id).await {
            Ok(()) => {
                saga.advance(SagaPhase::Done);
                saga.emit(Event::BookingConfirmed {
                    booking_id: booking.id.clone(),
                    slot_id: slot.id.clone(),
                });
            }
            Err(detail) => {
                saga.emit(Event::InconsistentState {
                    slot_id: slot.id.clone(),
                    detail: detail.clone(),
                });
                saga.stuck(detail);
            }
        }

        Ok(booking)
    }

    async fn read_slot(&self, id: &SlotId) -> Result<Slot, CallError<SlotStoreError>> {
        self.config
            .retry
            .run(move |_| self.call(self.slots.get(id)), CallError::is_retryable)
            .await
    }

    async fn write_ledger(&self, new: &NewBooking) -> Result<Booking, CallError<LedgerError>> {
        self.config
            .retry
            .run(
                move |attempt| {
                    if attempt > 0 {
                        tracing::debug!(attempt, "retrying ledger write");
                    }
                    self.call(self.ledger.create(new.clone()))
                },
                CallError::is_retryable,
            )
            .await
    }

    /// After retries are spent, check whether one of the writes landed anyway
    async fn find_landed(&self, new: &NewBooking) -> Option<Booking> {
        match self.call(self.ledger.live_for_slot(&new.slot_id)).await {
            Ok(Some(booking)) if booking.idempotency_key == new.idempotency_key => {
                tracing::info!(booking_id = %booking.id, "ledger write landed despite errors");
                Some(booking)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not check ledger before compensating");
                None
            }
        }
    }

    async fn confirm(&self, id: &SlotId) -> Result<(), String> {
        let confirmed = self
            .transition_with_retry(id, SlotStatus::Held, SlotStatus::Booked)
            .await;
        match confirmed {
            Ok(Transition::Applied(_)) => Ok(()),
            // The reconciler, or our own lost ack, got there first
            Ok(Transition::Conflict {
                actual: SlotStatus::Booked,
            }) => Ok(()),
            Ok(Transition::Conflict { actual }) => {
                Err(format!("booking written but slot is {}", actual))
            }
            Err(e) => Err(format!("booking written but confirm failed: {}", e)),
        }
    }

    /// Undo the hold after a failed ledger write
    async fn compensate(&self, saga: &mut Saga, id: &SlotId, reason: String) {
        saga.advance(SagaPhase::Compensating);
        let released = self
            .transition_with_retry(id, SlotStatus::Held, SlotStatus::Open)
            .await;
        match released {
            Ok(Transition::Applied(_))
            | Ok(Transition::Conflict {
                actual: SlotStatus::Open,
            }) => {
                saga.advance(SagaPhase::RolledBack);
                saga.emit(Event::SagaCompensated {
                    slot_id: id.clone(),
                    reason,
                });
            }
            Ok(Transition::Conflict { actual }) => {
                saga.stuck(format!("compensation found slot {} ({})", actual, reason));
            }
            Err(e) => saga.stuck(format!("compensation failed: {} ({})", e, reason)),
        }
    }

    async fn run_cancel(&self, id: BookingId) -> Result<Booking, ReservationError> {
        let span = tracing::info_span!("saga.cancel", booking_id = %id);
        self.drive_cancel(&id).instrument(span).await
    }

    async fn drive_cancel(&self, id: &BookingId) -> Result<Booking, ReservationError> {
        let current = self
            .config
            .retry
            .run(move |_| self.call(self.ledger.get(id)), CallError::is_retryable)
            .await
            .map_err(|e| e.into_reservation())?;
        if !current.is_live() {
            tracing::debug!("already cancelled");
            return Ok(current);
        }

        let booking = self
            .config
            .retry
            .run(move |_| self.call(self.ledger.cancel(id)), CallError::is_retryable)
            .await
            .map_err(|e| e.into_reservation())?;
        Event::BookingCancelled {
            booking_id: booking.id.clone(),
            slot_id: booking.slot_id.clone(),
        }
        .log();

        self.release(&booking.slot_id).await;
        Ok(booking)
    }

    /// Return a cancelled booking's slot to OPEN
    ///
    /// Failures here are logged; the reconciler reopens a BOOKED slot with no
    /// live booking.
    async fn release(&self, id: &SlotId) {
        let from_booked = self
            .transition_with_retry(id, SlotStatus::Booked, SlotStatus::Open)
            .await;
        let released = match from_booked {
            Ok(Transition::Applied(_)) => Some(SlotStatus::Booked),
            // Confirm never landed
            Ok(Transition::Conflict {
                actual: SlotStatus::Held,
            }) => match self.transition_with_retry(id, SlotStatus::Held, SlotStatus::Open).await {
                Ok(Transition::Applied(_)) => Some(SlotStatus::Held),
                Ok(Transition::Conflict { actual }) => {
                    tracing::debug!(%actual, "slot moved during release");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "release deferred to reconciler");
                    None
                }
            },
            Ok(Transition::Conflict { actual }) => {
                tracing::debug!(%actual, "slot already released");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "release deferred to reconciler");
                None
            }
        };
        if let Some(from) = released {
            Event::SlotReleased {
                slot_id: id.clone(),
                from,
            }
            .log();
        }
    }

    async fn transition_with_retry(
        &self,
        id: &SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<Transition, CallError<SlotStoreError>> {
        self.config
            .retry
            .run(
                move |_| self.call(self.slots.transition_if(id, expected, new)),
                CallError::is_retryable,
            )
            .await
    }

    /// Run one store call under the call timeout
    async fn call<T, E>(
        &self,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, CallError<E>> {
        let timeout = self.config.call_timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result.map_err(CallError::Failed),
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "store call timed out");
                Err(CallError::TimedOut(timeout))
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
