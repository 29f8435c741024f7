// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Users service client over HTTP

use super::{UserDirectory, UserError, UserSummary};
use async_trait::async_trait;
use std::time::Duration;

/// Client for `GET {base_url}/users/{id}`
///
/// ureq is blocking, so each lookup runs on the blocking pool.
#[derive(Clone)]
pub struct HttpUserDirectory {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpUserDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn fetch(agent: &ureq::Agent, url: &str) -> Result<Option<UserSummary>, UserError> {
    let mut response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::StatusCode(404)) => return Ok(None),
        Err(e) => return Err(UserError::Request(e.to_string())),
    };
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| UserError::Decode(e.to_string()))?;
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| UserError::Decode(e.to_string()))
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn lookup(&self, id: &str) -> Result<Option<UserSummary>, UserError> {
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Ok(None);
        }
        let url = format!("{}/users/{}", self.base_url, id);
        let agent = self.agent.clone();
        let started = std::time::Instant::now();
        let result = tokio::task::spawn_blocking(move || fetch(&agent, &url))
            .await
            .map_err(|e| UserError::Request(e.to_string()))?;
        tracing::debug!(
            user_id = id,
            found = matches!(result, Ok(Some(_))),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "user lookup"
        );
        result
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
