//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals into [`Shutdown`] triggers
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Repeated signals are re-broadcast; the launcher acts on the first one

use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};

/// Forward SIGINT/SIGTERM to `shutdown` until the runtime stops.
#[cfg(unix)]
pub async fn forward_signals(shutdown: Shutdown) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    loop {
        let reason = tokio::select! {
            _ = interrupt.recv() => ShutdownReason::Interrupt,
            _ = terminate.recv() => ShutdownReason::Terminate,
        };
        tracing::info!(signal = %reason, "Shutdown signal received");
        shutdown.trigger(reason);
    }
}

#[cfg(not(unix))]
pub async fn forward_signals(shutdown: Shutdown) -> std::io::Result<()> {
    loop {
        tokio::signal::ctrl_c().await?;
        tracing::info!(signal = %ShutdownReason::Interrupt, "Shutdown signal received");
        shutdown.trigger(ShutdownReason::Interrupt);
    }
}

/// Run [`forward_signals`] in the background, logging registration failures.
pub fn spawn_signal_forwarder(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = forward_signals(shutdown).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    })
}
