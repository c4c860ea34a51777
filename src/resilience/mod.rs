//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Readiness polling and inference restarts:
//!     → backoff.rs (next delay, exponential + jitter, capped)
//! ```
//!
//! # Design Decisions
//! - Spawn failures are never retried; only probes and supervised restarts back off
//! - Jittered backoff so restarted engines don't sync up with their probes

pub mod backoff;

pub use backoff::Backoff;
