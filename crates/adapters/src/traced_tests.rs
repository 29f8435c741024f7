// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ledger::FakeBookingLedger;
use crate::slots::FakeSlotStore;
use chrono::{TimeZone, Utc};
use sb_core::booking::DEFAULT_CURRENCY;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn interval() -> RequestedInterval {
    RequestedInterval {
        start: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
    }
}

#[test]
fn traced_transition_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeSlotStore::default();
        let slot = fake.seed("m1", interval()).await.unwrap();
        let traced = TracedSlotStore::new(fake);
        traced
            .transition_if(&slot.id, SlotStatus::Open, SlotStatus::Held)
            .await
    });

    assert!(result.unwrap().is_applied());
    assert!(
        logs.contains("slots.transition_if"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(logs.contains("applied"), "Logs:\n{}", logs);
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_transition_logs_conflict_quietly() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeSlotStore::default();
        let slot = fake.seed("m1", interval()).await.unwrap();
        let traced = TracedSlotStore::new(fake);
        traced
            .transition_if(&slot.id, SlotStatus::Held, SlotStatus::Booked)
            .await
    });

    assert_eq!(
        result.unwrap(),
        Transition::Conflict {
            actual: SlotStatus::Open
        }
    );
    assert!(logs.contains("conflict"), "Logs:\n{}", logs);
    assert!(!logs.contains("WARN"), "Conflict is not a warning. Logs:\n{}", logs);
}

#[test]
fn traced_transition_warns_on_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeSlotStore::default();
        let slot = fake.seed("m1", interval()).await.unwrap();
        fake.fail_transitions(SlotStatus::Open, SlotStatus::Held, 1);
        let traced = TracedSlotStore::new(fake);
        traced
            .transition_if(&slot.id, SlotStatus::Open, SlotStatus::Held)
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("transition failed"), "Logs:\n{}", logs);
}

#[test]
fn traced_publish_logs_counts() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedSlotStore::new(FakeSlotStore::default());
        let bad = RequestedInterval {
            start: interval().end,
            end: interval().start,
        };
        traced.publish("m1", &[interval(), bad]).await
    });

    let report = result.unwrap();
    assert_eq!(report.created.len(), 1);
    assert!(logs.contains("slots.publish"), "Logs:\n{}", logs);
    assert!(logs.contains("rejected=1"), "Logs:\n{}", logs);
}

#[test]
fn traced_ledger_create_logs_booking_and_conflict() {
    let (logs, result) = with_tracing(|| async {
        let slots = FakeSlotStore::default();
        let slot = slots.seed("m1", interval()).await.unwrap();
        let traced = TracedBookingLedger::new(FakeBookingLedger::default());

        traced
            .create(NewBooking::for_slot(&slot, "a", 0.0, DEFAULT_CURRENCY, ""))
            .await
            .unwrap();
        traced
            .create(NewBooking::for_slot(&slot, "b", 0.0, DEFAULT_CURRENCY, ""))
            .await
    });

    assert!(matches!(result, Err(LedgerError::Conflict { .. })));
    assert!(logs.contains("ledger.create"), "Logs:\n{}", logs);
    assert!(logs.contains("booking written"), "Logs:\n{}", logs);
    assert!(logs.contains("slot already booked"), "Logs:\n{}", logs);
}

#[tokio::test]
async fn traced_wrappers_pass_through_results() {
    let fake = FakeBookingLedger::default();
    let traced = TracedBookingLedger::new(fake.clone());
    let err = traced.cancel(&BookingId::new("missing")).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
    assert_eq!(traced.inner().calls().len(), 1);
}
