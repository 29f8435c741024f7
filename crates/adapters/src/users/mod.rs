// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Users service adapters, used read-only for display enrichment

mod http;
mod noop;

pub use http::HttpUserDirectory;
pub use noop::NoOpUserDirectory;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeUserDirectory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from user lookups
#[derive(Debug, Error)]
pub enum UserError {
    #[error("users service request failed: {0}")]
    Request(String),
    #[error("users service returned an unreadable body: {0}")]
    Decode(String),
}

/// The profile fields shown next to a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Lookup of user profiles by id
#[async_trait]
pub trait UserDirectory: Clone + Send + Sync + 'static {
    /// `Ok(None)` when the user does not exist
    async fn lookup(&self, id: &str) -> Result<Option<UserSummary>, UserError>;
}
