//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and env parsing handle syntax)
//! - Reject settings that would make a launch step impossible
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LauncherConfig → Result<(), Vec<ValidationError>>
//! - Port conflicts between the two children are not checked

use thiserror::Error;

use crate::config::schema::{LauncherConfig, ReadinessMode};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}.program must not be empty")]
    EmptyProgram(&'static str),

    #[error("model.path must not be empty")]
    EmptyModelPath,

    #[error("readiness.health_path must start with '/', got `{0}`")]
    HealthPath(String),

    #[error("readiness.{0} must be greater than zero in poll mode")]
    ZeroPollSetting(&'static str),
}

pub fn validate_config(config: &LauncherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.inference.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram("inference"));
    }
    if config.adapter.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram("adapter"));
    }
    if config.model.path.is_empty() {
        errors.push(ValidationError::EmptyModelPath);
    }

    let readiness = &config.readiness;
    if readiness.mode == ReadinessMode::Poll {
        if !readiness.health_path.starts_with('/') {
            errors.push(ValidationError::HealthPath(readiness.health_path.clone()));
        }
        if readiness.probe_timeout_ms == 0 {
            errors.push(ValidationError::ZeroPollSetting("probe_timeout_ms"));
        }
        if readiness.poll_interval_ms == 0 {
            errors.push(ValidationError::ZeroPollSetting("poll_interval_ms"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
