//! vLLM + API adapter launcher library.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod process;
pub mod resilience;

pub use config::LauncherConfig;
pub use lifecycle::{Launcher, Shutdown};
