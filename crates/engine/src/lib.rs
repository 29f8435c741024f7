// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Slot reservation engine: the booking saga and the background reconciler

mod coordinator;
mod error;
mod reconciler;

pub use coordinator::{BookRequest, CoordinatorConfig, ReservationCoordinator, SagaOutcome};
pub use error::{CallError, Transient};
pub use reconciler::{ReconcileReport, Reconciler, ReconcilerConfig};
