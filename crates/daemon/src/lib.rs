// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sb-daemon: the `sbd` reservation service
//!
//! Configuration, lifecycle, and the HTTP API over the reservation
//! coordinator.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use config::{Config, ConfigError, Paths};
pub use error::ApiError;
pub use lifecycle::{startup, DaemonState, LifecycleError, Users};
pub use server::{router, AppState};
