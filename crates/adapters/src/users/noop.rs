// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op directory for when no users service is configured.

use super::{UserDirectory, UserError, UserSummary};
use async_trait::async_trait;

/// Directory that knows nobody.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpUserDirectory;

impl NoOpUserDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserDirectory for NoOpUserDirectory {
    async fn lookup(&self, _id: &str) -> Result<Option<UserSummary>, UserError> {
        Ok(None)
    }
}
