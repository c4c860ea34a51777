//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn the resolved configuration into a [`LaunchPlan`]
//! - Start the inference server in the background
//! - Hold the adapter back behind the readiness gate
//! - Start the adapter and hand both children to the supervisor
//!
//! # Design Decisions
//! - Fail fast: any spawn or readiness error is fatal, nothing is retried
//! - An early return drops the child handles, which kills the children
//! - The plan is computed without side effects so `--dry-run` shows exactly
//!   what `run` would execute

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::{LauncherConfig, ReadinessMode, SupervisionPolicy};
use crate::health::{ReadinessError, ReadinessGate, ReadinessOutcome};
use crate::lifecycle::shutdown::ShutdownListener;
use crate::lifecycle::supervisor::{LaunchOutcome, Supervisor};
use crate::process::{adapter_command, inference_command, CommandSpec, ManagedChild, ProcessError};

/// Errors that abort a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("readiness wait failed: {0}")]
    Readiness(#[from] ReadinessError),
}

/// Everything the launcher will execute, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub inference: CommandSpec,
    pub readiness: ReadinessMode,
    pub startup_delay_secs: u64,
    pub adapter: CommandSpec,
    pub supervision: SupervisionPolicy,
}

pub struct Launcher {
    config: LauncherConfig,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn plan(&self) -> LaunchPlan {
        LaunchPlan {
            inference: inference_command(&self.config),
            readiness: self.config.readiness.mode,
            startup_delay_secs: self.config.readiness.startup_delay_secs,
            adapter: adapter_command(&self.config),
            supervision: self.config.supervision.policy,
        }
    }

    /// Launch both children and supervise them until the launcher should exit.
    pub async fn run(&self, mut shutdown: ShutdownListener) -> Result<LaunchOutcome, LaunchError> {
        let plan = self.plan();
        let gate = ReadinessGate::new(&self.config)?;
        let grace = Duration::from_secs(self.config.supervision.shutdown_grace_secs);

        let mut inference = ManagedChild::spawn(&plan.inference)?;

        match gate.wait(&mut inference, &mut shutdown).await {
            Ok(ReadinessOutcome::Waited(delay)) => {
                tracing::info!(delay_secs = delay.as_secs(), "Startup delay elapsed");
            }
            Ok(ReadinessOutcome::Ready { probes, elapsed }) => {
                tracing::info!(
                    probes,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Inference server is ready"
                );
            }
            Ok(ReadinessOutcome::TimedOut { probes, elapsed }) => {
                tracing::warn!(
                    probes,
                    elapsed_secs = elapsed.as_secs(),
                    "Inference server not ready within startup delay, starting adapter anyway"
                );
            }
            Err(ReadinessError::Interrupted(reason)) => {
                tracing::info!(signal = %reason, "Interrupted before adapter start");
                inference.terminate(grace).await;
                return Ok(LaunchOutcome::shutdown(reason));
            }
            Err(e) => return Err(e.into()),
        }

        let adapter = ManagedChild::spawn(&plan.adapter)?;

        let supervisor = Supervisor::new(self.config.supervision.clone(), plan.inference);
        let outcome = supervisor.run(inference, adapter, &mut shutdown).await?;

        tracing::info!(
            exit_code = outcome.exit_code,
            reason = ?outcome.reason,
            "Launcher finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::process::StdinMode;

    #[test]
    fn default_plan_matches_legacy_script() {
        let plan = Launcher::new(LauncherConfig::default()).plan();

        let inference = CommandSpec {
            name: "inference",
            program: "python3".into(),
            args: [
                "-m",
                "vllm.entrypoints.openai.api_server",
                "--model",
                "/model",
                "--tokenizer",
                "/model",
                "--host",
                "0.0.0.0",
                "--port",
                "11434",
                "--served-model-name",
                "llama4",
                "--tensor-parallel-size",
                "1",
                "--max-model-len",
                "32768",
                "--max-num-batched-tokens",
                "1024",
                "--max-num-seqs",
                "128",
                "--trust-remote-code",
            ]
            .map(String::from)
            .to_vec(),
            env: BTreeMap::new(),
            stdin: StdinMode::Null,
        };
        let adapter = CommandSpec {
            name: "adapter",
            program: "uvicorn".into(),
            args: [
                "open_responses_server.api_controller:app",
                "--host",
                "0.0.0.0",
                "--port",
                "8003",
            ]
            .map(String::from)
            .to_vec(),
            env: BTreeMap::from(
                [
                    ("API_ADAPTER_HOST", "0.0.0.0"),
                    ("API_ADAPTER_PORT", "8003"),
                    ("ENABLE_MCP_TOOLS", "false"),
                    ("OPENAI_BASE_URL", "http://localhost:8003"),
                    ("OPENAI_BASE_URL_INTERNAL", "http://localhost:11434"),
                ]
                .map(|(k, v)| (k.to_string(), v.to_string())),
            ),
            stdin: StdinMode::Inherit,
        };

        assert_eq!(
            plan,
            LaunchPlan {
                inference,
                readiness: ReadinessMode::Fixed,
                startup_delay_secs: 6000,
                adapter,
                supervision: SupervisionPolicy::None,
            }
        );
    }

    #[test]
    fn plan_serializes_for_dry_run() {
        let plan = Launcher::new(LauncherConfig::default()).plan();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["readiness"], "fixed");
        assert_eq!(json["supervision"], "none");
        assert_eq!(json["inference"]["name"], "inference");
        assert_eq!(json["adapter"]["env"]["ENABLE_MCP_TOOLS"], "false");
    }
}
