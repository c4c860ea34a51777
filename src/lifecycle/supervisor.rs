//! Child supervision once both processes are running.
//!
//! # Responsibilities
//! - Wait on the adapter, the inference server and shutdown concurrently
//! - Apply the configured policy when the inference server exits
//! - Tear down whatever is still running and pick the exit code
//!
//! # Policies
//! ```text
//! none:    inference exit logged, adapter keeps serving (legacy behaviour)
//! exit:    inference exit stops the adapter, launcher exits non-zero
//! restart: inference respawned with backoff, `exit` once the budget is spent
//! ```
//! The adapter exiting always ends the launcher with the adapter's code.

use std::process::ExitStatus;
use std::time::Duration;

use crate::config::{SupervisionConfig, SupervisionPolicy};
use crate::lifecycle::shutdown::{ShutdownListener, ShutdownReason};
use crate::process::{exit_code, CommandSpec, ManagedChild, ProcessError};
use crate::resilience::Backoff;

/// Why the launcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    AdapterExited,
    InferenceExited { code: i32, restarts: u32 },
    Shutdown(ShutdownReason),
}

/// Final result of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Code the launcher process should exit with.
    pub exit_code: i32,
    pub reason: ExitReason,
}

impl LaunchOutcome {
    pub fn shutdown(reason: ShutdownReason) -> Self {
        Self {
            exit_code: reason.exit_code(),
            reason: ExitReason::Shutdown(reason),
        }
    }
}

pub struct Supervisor {
    config: SupervisionConfig,
    inference_spec: CommandSpec,
}

impl Supervisor {
    pub fn new(config: SupervisionConfig, inference_spec: CommandSpec) -> Self {
        Self {
            config,
            inference_spec,
        }
    }

    fn grace(&self) -> Duration {
        Duration::from_secs(self.config.shutdown_grace_secs)
    }

    pub async fn run(
        &self,
        inference: ManagedChild,
        mut adapter: ManagedChild,
        shutdown: &mut ShutdownListener,
    ) -> Result<LaunchOutcome, ProcessError> {
        let mut inference = Some(inference);
        let mut restarts = 0u32;
        let mut backoff = Backoff::new(
            Duration::from_millis(self.config.restart_base_delay_ms),
            Duration::from_millis(self.config.restart_max_delay_ms),
        );

        tracing::info!(policy = %self.config.policy, "Supervising inference server and adapter");

        loop {
            tokio::select! {
                status = adapter.wait() => {
                    let code = exit_code(&status?);
                    tracing::info!(exit_code = code, "Adapter exited");
                    if let Some(child) = inference.as_mut() {
                        child.terminate(self.grace()).await;
                    }
                    return Ok(LaunchOutcome {
                        exit_code: code,
                        reason: ExitReason::AdapterExited,
                    });
                }
                status = wait_optional(&mut inference) => {
                    let code = exit_code(&status?);
                    inference = None;

                    match self.config.policy {
                        SupervisionPolicy::None => {
                            tracing::warn!(
                                exit_code = code,
                                "Inference server exited; adapter keeps running without a backend"
                            );
                        }
                        SupervisionPolicy::Restart if restarts < self.config.max_restarts => {
                            restarts += 1;
                            let pause = backoff.next_delay();
                            tracing::warn!(
                                exit_code = code,
                                attempt = restarts,
                                max_restarts = self.config.max_restarts,
                                delay_ms = pause.as_millis() as u64,
                                "Inference server exited, restarting"
                            );

                            tokio::select! {
                                _ = tokio::time::sleep(pause) => {}
                                reason = shutdown.recv() => {
                                    adapter.terminate(self.grace()).await;
                                    return Ok(LaunchOutcome::shutdown(reason));
                                }
                            }
                            inference = Some(ManagedChild::spawn(&self.inference_spec)?);
                        }
                        SupervisionPolicy::Exit | SupervisionPolicy::Restart => {
                            tracing::error!(
                                exit_code = code,
                                restarts,
                                "Inference server exited, stopping adapter"
                            );
                            adapter.terminate(self.grace()).await;
                            return Ok(LaunchOutcome {
                                exit_code: if code == 0 { 1 } else { code },
                                reason: ExitReason::InferenceExited { code, restarts },
                            });
                        }
                    }
                }
                reason = shutdown.recv() => {
                    tracing::info!(signal = %reason, "Stopping children");
                    adapter.terminate(self.grace()).await;
                    if let Some(child) = inference.as_mut() {
                        child.terminate(self.grace()).await;
                    }
                    return Ok(LaunchOutcome::shutdown(reason));
                }
            }
        }
    }
}

/// Wait on an optional child; pending forever when there is none.
async fn wait_optional(child: &mut Option<ManagedChild>) -> Result<ExitStatus, ProcessError> {
    match child {
        Some(child) => child.wait().await,
        None => std::future::pending().await,
    }
}
