// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::time::Instant;

use async_trait::async_trait;
use fs2::FileExt;
use sb_adapters::{
    BookingLedger, DurableBookingLedger, DurableSlotStore, HttpUserDirectory, LedgerError,
    NoOpUserDirectory, SlotStore, SlotStoreError, TracedBookingLedger, TracedSlotStore,
    UserDirectory, UserError, UserSummary,
};
use sb_core::{SystemClock, UuidIdGen};
use sb_engine::{Reconciler, ReservationCoordinator};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, Paths};
use crate::server::{self, AppState};

/// Slot store with concrete types (wrapped with tracing)
pub type DaemonSlots = TracedSlotStore<DurableSlotStore<SystemClock, UuidIdGen>>;
/// Booking ledger with concrete types (wrapped with tracing)
pub type DaemonLedger = TracedBookingLedger<DurableBookingLedger<SystemClock, UuidIdGen>>;
pub type DaemonCoordinator = ReservationCoordinator<DaemonSlots, DaemonLedger>;
pub type DaemonReconciler = Reconciler<DaemonSlots, DaemonLedger, SystemClock>;

/// Users directory chosen by configuration
#[derive(Clone)]
pub enum Users {
    Http(HttpUserDirectory),
    Disabled(NoOpUserDirectory),
}

#[async_trait]
impl UserDirectory for Users {
    async fn lookup(&self, id: &str) -> Result<Option<UserSummary>, UserError> {
        match self {
            Users::Http(users) => users.lookup(id).await,
            Users::Disabled(users) => users.lookup(id).await,
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Taken by `serve`
    listener: Option<TcpListener>,
    pub local_addr: SocketAddr,
    pub coordinator: DaemonCoordinator,
    pub reconciler: DaemonReconciler,
    pub users: Users,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    /// Serve the HTTP API until `shutdown` resolves
    pub fn serve<F>(
        &mut self,
        shutdown: F,
    ) -> Result<JoinHandle<std::io::Result<()>>, LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.listener.take().ok_or(LifecycleError::AlreadyServing)?;
        let app = server::router(AppState::new(self.coordinator.clone(), self.users.clone()));
        Ok(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
        }))
    }

    /// Run one reconciler pass, logging instead of failing
    pub async fn reconcile(&self) {
        match self.reconciler.tick().await {
            Ok(report) if report.repaired > 0 => {
                info!(repaired = report.repaired, "reconciler repaired slots");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "reconcile tick failed"),
        }
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // Lock is released when self.lock_file is dropped
        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Slot store error: {0}")]
    Slots(#[from] SlotStoreError),

    #[error("Booking ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP server already started")]
    AlreadyServing,
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    let paths = config.paths()?;
    match startup_inner(config, &paths).await {
        Ok(state) => Ok(state),
        // Another daemon owns the pid file
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            cleanup_on_failure(&paths);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config, paths: &Paths) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&paths.state_dir)?;

    // 2. Acquire lock file FIRST - prevents two daemons sharing one WAL
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Replay WALs
    let slots = TracedSlotStore::new(DurableSlotStore::open(
        &paths.slots_wal,
        SystemClock,
        UuidIdGen::with_prefix("slot"),
    )?);
    let ledger = TracedBookingLedger::new(DurableBookingLedger::open(
        &paths.bookings_wal,
        SystemClock,
        UuidIdGen::with_prefix("bk"),
    )?);

    let slot_counts = slots.counts().await?;
    let booking_counts = ledger.counts().await?;
    info!(
        "Loaded state: {} open, {} held, {} booked slots; {} confirmed, {} cancelled bookings",
        slot_counts.open,
        slot_counts.held,
        slot_counts.booked,
        booking_counts.confirmed,
        booking_counts.cancelled
    );

    // 4. Wire up the coordinator and reconciler
    let coordinator =
        ReservationCoordinator::new(slots.clone(), ledger.clone(), config.coordinator_config());
    let reconciler = Reconciler::new(slots, ledger, SystemClock, config.reconciler_config());
    let users = match &config.users.api_url {
        Some(url) => {
            info!(url = %url, "users service enrichment enabled");
            Users::Http(HttpUserDirectory::new(url.clone(), config.users.timeout))
        }
        None => Users::Disabled(NoOpUserDirectory::new()),
    };

    // 5. Repair sagas interrupted by the previous run, before taking traffic
    if slot_counts.held > 0 {
        warn!(
            "Found {} held slots from previous session, reconciling",
            slot_counts.held
        );
    }
    match reconciler.tick().await {
        Ok(report) => info!(
            scanned = report.scanned,
            repaired = report.repaired,
            "startup reconcile complete"
        ),
        Err(e) => warn!(error = %e, "startup reconcile failed"),
    }

    // 6. Bind (LAST - only after all validation passes)
    let addr = config.server.listen_addr;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(addr, e))?;
    let local_addr = listener.local_addr()?;

    info!(state_dir = %paths.state_dir.display(), "Daemon started");

    Ok(DaemonState {
        paths: paths.clone(),
        lock_file,
        listener: Some(listener),
        local_addr,
        coordinator,
        reconciler,
        users,
        start_time: Instant::now(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &Paths) {
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
