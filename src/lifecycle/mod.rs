//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Plan → Spawn inference → Readiness gate → Spawn adapter
//!
//! Supervision (supervisor.rs):
//!     Adapter exit → stop inference → exit with adapter's code
//!     Inference exit → policy (ignore / exit / restart)
//!
//! Shutdown (shutdown.rs):
//!     Trigger → stop adapter → stop inference → exit 128 + signal
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: inference first, adapter only after the gate
//! - The launcher owns both child handles; nothing relies on job control
//! - Shutdown has a grace period per child

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::{Shutdown, ShutdownListener, ShutdownReason};
pub use startup::{LaunchError, LaunchPlan, Launcher};
pub use supervisor::{ExitReason, LaunchOutcome, Supervisor};
