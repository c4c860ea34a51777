//! Inference server readiness subsystem.
//!
//! # Data Flow
//! ```text
//! inference server spawned
//!     → readiness.rs (fixed sleep, or poll loop)
//!         → probe.rs (GET http://localhost:<port>/health)
//!         → resilience::Backoff between probes
//!     → ReadinessOutcome → launcher starts the adapter
//! ```
//!
//! # Design Decisions
//! - Readiness is a one-shot gate, not a continuous monitor
//! - The startup delay is the upper bound of every wait

pub mod probe;
pub mod readiness;

use thiserror::Error;

use crate::lifecycle::shutdown::ShutdownReason;
use crate::process::ProcessError;

pub use probe::{health_url, HealthProbe, ProbeOutcome};
pub use readiness::{ReadinessGate, ReadinessOutcome};

/// Errors that end the readiness wait early.
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("invalid health URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build health probe client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("inference server exited with code {code} before becoming ready")]
    InferenceExited { code: i32 },

    #[error("interrupted by {0}")]
    Interrupted(ShutdownReason),

    #[error(transparent)]
    Process(#[from] ProcessError),
}
