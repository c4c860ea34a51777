//! Child process subsystem.
//!
//! # Data Flow
//! ```text
//! LauncherConfig
//!     → command.rs (inference flags, adapter flags + derived env)
//!     → CommandSpec (pure, printable)
//!     → child.rs (spawn with inherited output, owned handle)
//! ```
//!
//! # Design Decisions
//! - Command construction is separate from spawning so it can be tested and
//!   printed by `--dry-run` without launching anything
//! - The launcher owns every child handle explicitly

pub mod child;
pub mod command;

use thiserror::Error;

pub use child::{exit_code, ManagedChild};
pub use command::{adapter_command, adapter_env, inference_command, CommandSpec, StdinMode};

/// Errors raised while managing a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {name} (`{program}`): {source}")]
    Spawn {
        name: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait on {name}: {source}")]
    Wait {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
