//! Configuration loading from disk and the process environment.
//!
//! # Precedence
//! ```text
//! built-in defaults < TOML file < environment variables < [`Overrides`]
//! ```
//! Validation runs once, on the fully layered result.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LauncherConfig, ReadinessMode, SupervisionPolicy};
use crate::config::validation::{validate_config, ValidationError};

pub const MODEL_PATH: &str = "MODEL_PATH";
pub const VLLM_PORT: &str = "VLLM_PORT";
pub const API_ADAPTER_HOST: &str = "API_ADAPTER_HOST";
pub const API_ADAPTER_PORT: &str = "API_ADAPTER_PORT";
pub const SERVICED_MODEL_NAME: &str = "SERVICED_MODEL_NAME";
pub const TOKENIZER_PATH: &str = "TOKENIZER_PATH";
pub const TENSOR_PARALLEL_SIZE: &str = "TENSOR_PARALLEL_SIZE";
pub const VLLM_STARTUP_DELAY: &str = "VLLM_STARTUP_DELAY";
pub const MAX_MODEL_LEN: &str = "MAX_MODEL_LEN";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LAUNCHER_READINESS: &str = "LAUNCHER_READINESS";
pub const LAUNCHER_SUPERVISION: &str = "LAUNCHER_SUPERVISION";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: `{value}` ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Settings forced from the command line, applied after the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub readiness: Option<ReadinessMode>,
    pub supervision: Option<SupervisionPolicy>,
}

impl Overrides {
    pub fn apply(&self, config: &mut LauncherConfig) {
        if let Some(mode) = self.readiness {
            config.readiness.mode = mode;
        }
        if let Some(policy) = self.supervision {
            config.supervision.policy = policy;
        }
    }
}

/// Load a TOML file without applying the environment.
pub fn load_config(path: &Path) -> Result<LauncherConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: LauncherConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Build the effective configuration: optional file, then the environment
/// seen through `lookup`, then validation.
pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<LauncherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    load_with(path, lookup, &Overrides::default())
}

/// Like [`load`], with `overrides` layered on top before validating.
pub fn load_with<F>(
    path: Option<&Path>,
    lookup: F,
    overrides: &Overrides,
) -> Result<LauncherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match path {
        Some(path) => load_config(path)?,
        None => LauncherConfig::default(),
    };

    let mut config = resolve_env(base, lookup)?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Like [`load_with`], reading the real process environment.
pub fn from_env(path: Option<&Path>, overrides: &Overrides) -> Result<LauncherConfig, ConfigError> {
    load_with(path, |name| std::env::var(name).ok(), overrides)
}

/// Overlay environment variables onto `config`.
///
/// Unset and empty variables leave the existing value in place. Values only
/// forwarded to a child are taken verbatim; ports and the startup delay must
/// parse.
pub fn resolve_env<F>(mut config: LauncherConfig, lookup: F) -> Result<LauncherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(value) = get(MODEL_PATH) {
        config.model.path = value;
    }
    if let Some(value) = get(TOKENIZER_PATH) {
        config.model.tokenizer_path = Some(value);
    }
    if let Some(value) = get(SERVICED_MODEL_NAME) {
        config.model.served_name = value;
    }
    if let Some(value) = get(TENSOR_PARALLEL_SIZE) {
        config.model.tensor_parallel_size = value;
    }
    if let Some(value) = get(MAX_MODEL_LEN) {
        config.model.max_model_len = value;
    }
    if let Some(value) = get(VLLM_PORT) {
        config.inference.port = parse_var(VLLM_PORT, value)?;
    }
    if let Some(value) = get(API_ADAPTER_HOST) {
        config.adapter.host = value;
    }
    if let Some(value) = get(API_ADAPTER_PORT) {
        config.adapter.port = parse_var(API_ADAPTER_PORT, value)?;
    }
    if let Some(value) = get(VLLM_STARTUP_DELAY) {
        config.readiness.startup_delay_secs = parse_var(VLLM_STARTUP_DELAY, value)?;
    }
    if let Some(value) = get(LAUNCHER_READINESS) {
        config.readiness.mode = parse_var::<ReadinessMode>(LAUNCHER_READINESS, value)?;
    }
    if let Some(value) = get(LAUNCHER_SUPERVISION) {
        config.supervision.policy = parse_var::<SupervisionPolicy>(LAUNCHER_SUPERVISION, value)?;
    }
    if let Some(value) = get(LOG_LEVEL) {
        config.observability.log_level = value.to_lowercase();
    }

    Ok(config)
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        var,
        reason: e.to_string(),
        value,
    })
}
