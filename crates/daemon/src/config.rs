// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: TOML file, environment overrides, derived paths

use sb_core::RetryPolicy;
use sb_engine::{CoordinatorConfig, ReconcilerConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("could not determine state directory")]
    NoStateDir,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub users: UsersConfig,
    pub coordinator: CoordinatorSection,
    pub reconciler: ReconcilerSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 4103)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Defaults to `$XDG_STATE_HOME/sb`
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsersConfig {
    /// Base URL of the users service; enrichment is skipped when unset
    pub api_url: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorSection {
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for CoordinatorSection {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(2),
            max_attempts: 4,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerSection {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(with = "humantime_serde")]
    pub hold_timeout: Duration,
}

impl Default for ReconcilerSection {
    fn default() -> Self {
        let defaults = ReconcilerConfig::default();
        Self {
            interval: defaults.interval,
            hold_timeout: defaults.hold_timeout,
        }
    }
}

/// Files the daemon owns under its state directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub slots_wal: PathBuf,
    pub bookings_wal: PathBuf,
    /// Lock/PID file
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    pub fn under(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
            slots_wal: state_dir.join("slots.wal"),
            bookings_wal: state_dir.join("bookings.wal"),
            lock_path: state_dir.join("sbd.pid"),
            log_path: state_dir.join("sbd.log"),
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
                Self::parse(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SB_LISTEN_ADDR`, `SB_STATE_DIR` and `USERS_API_URL`
    pub fn apply_env(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = env("SB_LISTEN_ADDR") {
            self.server.listen_addr = value.parse().map_err(|_| ConfigError::Env {
                var: "SB_LISTEN_ADDR",
                value,
            })?;
        }
        if let Some(value) = env("SB_STATE_DIR").filter(|v| !v.is_empty()) {
            self.storage.state_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = env("USERS_API_URL") {
            // Empty disables enrichment
            self.users.api_url = Some(value).filter(|v| !v.trim().is_empty());
        }
        Ok(())
    }

    pub fn paths(&self) -> Result<Paths, ConfigError> {
        let state_dir = match &self.storage.state_dir {
            Some(dir) => dir.clone(),
            None => default_state_dir()?,
        };
        Ok(Paths::under(&state_dir))
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        let c = &self.coordinator;
        CoordinatorConfig {
            call_timeout: c.call_timeout,
            retry: RetryPolicy::new(c.max_attempts, c.base_delay, c.max_delay),
        }
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            interval: self.reconciler.interval,
            hold_timeout: self.reconciler.hold_timeout,
        }
    }
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    // dirs::state_dir honors XDG_STATE_HOME but is None off Linux
    let base = dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/state")))
        .ok_or(ConfigError::NoStateDir)?;
    Ok(base.join("sb"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
