//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the launcher.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the launcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Model weights, tokenizer and engine limits.
    pub model: ModelConfig,

    /// Inference server process settings.
    pub inference: InferenceConfig,

    /// API adapter process settings.
    pub adapter: AdapterConfig,

    /// How the launcher waits for the inference server before starting the adapter.
    pub readiness: ReadinessConfig,

    /// What happens when a child process exits.
    pub supervision: SupervisionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl LauncherConfig {
    /// Tokenizer location, falling back to the model path when not set.
    pub fn tokenizer_path(&self) -> &str {
        self.model
            .tokenizer_path
            .as_deref()
            .unwrap_or(&self.model.path)
    }
}

/// Model configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Filesystem path to model weights.
    pub path: String,

    /// Tokenizer location. `None` means "same as `path`".
    pub tokenizer_path: Option<String>,

    /// Model name advertised to clients.
    pub served_name: String,

    /// Inference parallelism degree, forwarded verbatim.
    pub tensor_parallel_size: String,

    /// Max context length, forwarded verbatim (the engine accepts e.g. `32k`).
    pub max_model_len: String,

    /// Batching limit: tokens per scheduler step.
    pub max_num_batched_tokens: u32,

    /// Batching limit: concurrent sequences.
    pub max_num_seqs: u32,

    /// Allow the inference server to execute model-supplied code.
    pub trust_remote_code: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "/model".to_string(),
            tokenizer_path: None,
            served_name: "llama4".to_string(),
            tensor_parallel_size: "1".to_string(),
            max_model_len: "32768".to_string(),
            max_num_batched_tokens: 1024,
            max_num_seqs: 128,
            trust_remote_code: true,
        }
    }
}

/// Inference server process configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    /// Executable to launch.
    pub program: String,

    /// Arguments placed before the generated flags.
    pub args: Vec<String>,

    /// Bind host. Always all-interfaces unless a config file says otherwise.
    pub host: String,

    /// Listen port.
    pub port: u16,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec![
                "-m".to_string(),
                "vllm.entrypoints.openai.api_server".to_string(),
            ],
            host: "0.0.0.0".to_string(),
            port: 11434,
        }
    }
}

/// API adapter process configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdapterConfig {
    /// Executable to launch.
    pub program: String,

    /// Arguments placed before `--host`/`--port`.
    pub args: Vec<String>,

    /// Bind address.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// Extra environment passed through to the adapter
    /// (e.g. `MCP_SERVERS_CONFIG_PATH`, `MAX_TOOL_CALL_ITERATIONS`).
    /// Derived upstream variables always win over entries here.
    pub env: BTreeMap<String, String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            program: "uvicorn".to_string(),
            args: vec!["open_responses_server.api_controller:app".to_string()],
            host: "0.0.0.0".to_string(),
            port: 8003,
            env: BTreeMap::new(),
        }
    }
}

/// Readiness strategy between the two launches.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessMode {
    /// Sleep for the full startup delay, no probing.
    #[default]
    Fixed,
    /// Probe the health endpoint until ready, bounded by the startup delay.
    Poll,
}

impl FromStr for ReadinessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(ReadinessMode::Fixed),
            "poll" => Ok(ReadinessMode::Poll),
            other => Err(format!("expected `fixed` or `poll`, got `{}`", other)),
        }
    }
}

impl fmt::Display for ReadinessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessMode::Fixed => write!(f, "fixed"),
            ReadinessMode::Poll => write!(f, "poll"),
        }
    }
}

/// Readiness configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Fixed sleep or health polling.
    pub mode: ReadinessMode,

    /// Seconds to wait before starting the adapter (upper bound in poll mode).
    pub startup_delay_secs: u64,

    /// Path probed on the inference server in poll mode.
    pub health_path: String,

    /// Per-probe timeout in milliseconds.
    pub probe_timeout_ms: u64,

    /// Initial delay between probes in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum delay between probes in milliseconds.
    pub max_poll_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: ReadinessMode::Fixed,
            startup_delay_secs: 6000,
            health_path: "/health".to_string(),
            probe_timeout_ms: 2000,
            poll_interval_ms: 500,
            max_poll_interval_ms: 5000,
        }
    }
}

/// Policy applied when the inference server exits while the adapter runs.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SupervisionPolicy {
    /// Log the exit and keep the adapter running.
    #[default]
    None,
    /// Stop the adapter and exit with the inference server's code.
    Exit,
    /// Respawn the inference server, up to `max_restarts` times.
    Restart,
}

impl FromStr for SupervisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SupervisionPolicy::None),
            "exit" => Ok(SupervisionPolicy::Exit),
            "restart" => Ok(SupervisionPolicy::Restart),
            other => Err(format!(
                "expected `none`, `exit` or `restart`, got `{}`",
                other
            )),
        }
    }
}

impl fmt::Display for SupervisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisionPolicy::None => write!(f, "none"),
            SupervisionPolicy::Exit => write!(f, "exit"),
            SupervisionPolicy::Restart => write!(f, "restart"),
        }
    }
}

/// Supervision configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SupervisionConfig {
    /// Policy for inference server exits.
    pub policy: SupervisionPolicy,

    /// Restart budget for the `restart` policy.
    pub max_restarts: u32,

    /// Base delay for restart backoff in milliseconds.
    pub restart_base_delay_ms: u64,

    /// Maximum delay for restart backoff in milliseconds.
    pub restart_max_delay_ms: u64,

    /// Time allowed for children to be reaped on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            policy: SupervisionPolicy::None,
            max_restarts: 3,
            restart_base_delay_ms: 1000,
            restart_max_delay_ms: 30_000,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
