// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake user directory for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{UserDirectory, UserError, UserSummary};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory user directory
#[derive(Clone, Default)]
pub struct FakeUserDirectory {
    users: Arc<Mutex<HashMap<String, UserSummary>>>,
    failing: Arc<Mutex<bool>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl FakeUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: &str, name: &str, email: &str) {
        self.users.lock().unwrap_or_else(|e| e.into_inner()).insert(
            id.to_string(),
            UserSummary {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
            },
        );
    }

    /// Make every lookup fail
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    /// Ids looked up so far
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn lookup(&self, id: &str) -> Result<Option<UserSummary>, UserError> {
        self.lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(id.to_string());
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(UserError::Request("injected failure".into()));
        }
        Ok(self
            .users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
