//! Shutdown coordination for the launcher.

use std::fmt;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Why the launcher is being asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

impl ShutdownReason {
    /// Exit code a shell would report for the matching signal.
    pub fn exit_code(self) -> i32 {
        match self {
            ShutdownReason::Interrupt => 128 + 2,
            ShutdownReason::Terminate => 128 + 15,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => write!(f, "SIGINT"),
            ShutdownReason::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the launcher and signal handler share.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self, reason: ShutdownReason) {
        let _ = self.tx.send(reason);
    }

    /// Get the number of active subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of [`Shutdown`].
pub struct ShutdownListener {
    rx: broadcast::Receiver<ShutdownReason>,
}

impl ShutdownListener {
    /// Resolve on the next shutdown trigger. Cancel-safe.
    ///
    /// Never resolves once every [`Shutdown`] handle is gone.
    pub async fn recv(&mut self) -> ShutdownReason {
        loop {
            match self.rx.recv().await {
                Ok(reason) => return reason,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => std::future::pending::<()>().await,
            }
        }
    }
}
