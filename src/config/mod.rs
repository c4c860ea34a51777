//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (overlay MODEL_PATH, VLLM_PORT, ... from the environment)
//!     → loader.rs (apply command-line overrides)
//!     → validation.rs (semantic checks)
//!     → LauncherConfig (validated, immutable)
//!     → borrowed by the command builders and the launcher
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never mutated afterwards
//! - All fields have defaults so an empty environment is a complete config
//! - Environment lookup is injectable so defaulting is testable in isolation

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, load, load_config, load_with, resolve_env, ConfigError, Overrides};
pub use schema::{
    AdapterConfig, InferenceConfig, LauncherConfig, ModelConfig, ObservabilityConfig,
    ReadinessConfig, ReadinessMode, SupervisionConfig, SupervisionPolicy,
};
