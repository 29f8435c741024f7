// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slot Booking Daemon (sbd)
//!
//! Serves the reservation API and runs the reconciler on a timer.

use std::path::PathBuf;

use sb_daemon::{lifecycle, Config, LifecycleError, Paths};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(PathBuf::from);

    // Load configuration
    let config = Config::load(config_path.as_deref())?;
    let paths = config.paths()?;

    // Write startup marker to log (before tracing setup, so it marks this attempt)
    write_startup_marker(&paths)?;

    // Set up logging
    let log_guard = setup_logging(&paths)?;

    info!("Starting sbd, state in {}", paths.state_dir.display());

    // Start daemon
    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&paths, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = daemon.serve(async move {
        let _ = stop_rx.await;
    })?;

    info!("Daemon ready, listening on {}", daemon.local_addr);

    // Signal ready for parent process (e.g., systemd, scripts waiting for startup)
    println!("READY");

    // Startup already ran one pass
    let mut reconcile = tokio::time::interval(daemon.reconciler.interval());
    reconcile.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    reconcile.tick().await;

    // Main event loop
    let server_exited = loop {
        tokio::select! {
            _ = reconcile.tick() => daemon.reconcile().await,

            result = &mut server => {
                match result {
                    Ok(Ok(())) => error!("HTTP server exited unexpectedly"),
                    Ok(Err(e)) => error!("HTTP server failed: {}", e),
                    Err(e) => error!("HTTP server task failed: {}", e),
                }
                break true;
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break false;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break false;
            }
        }
    };

    // Drain in-flight requests before releasing the lock
    if !server_exited {
        let _ = stop_tx.send(());
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("HTTP server failed during shutdown: {}", e),
            Err(e) => error!("HTTP server task failed: {}", e),
        }
    }
    daemon.shutdown().await?;

    info!(
        uptime_secs = daemon.start_time.elapsed().as_secs(),
        "Daemon stopped"
    );
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- sbd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- sbd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(paths: &Paths) -> Result<(), LifecycleError> {
    use std::io::Write;

    std::fs::create_dir_all(&paths.state_dir)?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(paths: &Paths, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    paths: &Paths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    std::fs::create_dir_all(&paths.state_dir)?;

    let file_name = paths
        .log_path
        .file_name()
        .ok_or_else(|| std::io::Error::other("log path has no file name"))?;
    let file_appender = tracing_appender::rolling::never(&paths.state_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
