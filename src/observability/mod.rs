//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config, process, health, lifecycle
//!     → tracing events with structured fields (child, pid, exit_code, ...)
//!     → logging.rs subscriber → stderr
//! ```
//!
//! Child stdout/stderr are inherited and bypass the subscriber.

pub mod logging;

pub use logging::{init_logging, log_config};
