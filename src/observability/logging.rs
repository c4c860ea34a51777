//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Log the resolved configuration once at startup
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins when set, otherwise `LOG_LEVEL` / `observability.log_level`
//!   applies to this crate

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LauncherConfig;

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(level: &str) -> String {
    format!("vllm_launcher={}", level.to_lowercase())
}

pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}

pub fn log_config(config: &LauncherConfig) {
    tracing::info!(
        model_path = %config.model.path,
        tokenizer_path = %config.tokenizer_path(),
        served_model_name = %config.model.served_name,
        tensor_parallel_size = %config.model.tensor_parallel_size,
        max_model_len = %config.model.max_model_len,
        "Model configuration"
    );
    tracing::info!(
        inference_port = config.inference.port,
        adapter_host = %config.adapter.host,
        adapter_port = config.adapter.port,
        extra_adapter_env = config.adapter.env.len(),
        "Process configuration"
    );
    tracing::info!(
        readiness = %config.readiness.mode,
        startup_delay_secs = config.readiness.startup_delay_secs,
        supervision = %config.supervision.policy,
        "Launch configuration"
    );
}
