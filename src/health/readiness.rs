//! Readiness gate between the inference server and the adapter.
//!
//! # Responsibilities
//! - Hold the adapter back until the inference server is (probably) up
//! - Fixed mode: sleep the full startup delay, nothing else
//! - Poll mode: probe until healthy, bounded by the startup delay
//!
//! # Design Decisions
//! - Fixed mode keeps the legacy behaviour exactly: no probe, no early exit
//!   when the inference server dies during the wait
//! - Poll mode timing out is not an error; the adapter still starts
//! - Both modes give way to a shutdown signal

use std::time::Duration;

use tokio::time::{self, Instant};

use crate::config::{LauncherConfig, ReadinessConfig, ReadinessMode};
use crate::health::probe::HealthProbe;
use crate::health::ReadinessError;
use crate::lifecycle::shutdown::ShutdownListener;
use crate::process::{exit_code, ManagedChild};
use crate::resilience::Backoff;

/// Stand-in deadline for delays too large to add to an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// How the wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// Fixed delay fully elapsed.
    Waited(Duration),
    /// Health endpoint answered with a success status.
    Ready { probes: u32, elapsed: Duration },
    /// The delay bound elapsed without a healthy probe.
    TimedOut { probes: u32, elapsed: Duration },
}

pub struct ReadinessGate {
    config: ReadinessConfig,
    probe: Option<HealthProbe>,
}

impl ReadinessGate {
    pub fn new(config: &LauncherConfig) -> Result<Self, ReadinessError> {
        let probe = match config.readiness.mode {
            ReadinessMode::Fixed => None,
            ReadinessMode::Poll => Some(HealthProbe::for_inference(config)?),
        };

        Ok(Self {
            config: config.readiness.clone(),
            probe,
        })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.config.startup_delay_secs)
    }

    pub async fn wait(
        &self,
        inference: &mut ManagedChild,
        shutdown: &mut ShutdownListener,
    ) -> Result<ReadinessOutcome, ReadinessError> {
        match &self.probe {
            None => self.wait_fixed(shutdown).await,
            Some(probe) => self.wait_polling(probe, inference, shutdown).await,
        }
    }

    async fn wait_fixed(
        &self,
        shutdown: &mut ShutdownListener,
    ) -> Result<ReadinessOutcome, ReadinessError> {
        let delay = self.delay();
        tracing::info!(delay_secs = delay.as_secs(), "Waiting fixed startup delay");

        tokio::select! {
            _ = time::sleep(delay) => Ok(ReadinessOutcome::Waited(delay)),
            reason = shutdown.recv() => Err(ReadinessError::Interrupted(reason)),
        }
    }

    async fn wait_polling(
        &self,
        probe: &HealthProbe,
        inference: &mut ManagedChild,
        shutdown: &mut ShutdownListener,
    ) -> Result<ReadinessOutcome, ReadinessError> {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.delay())
            .unwrap_or_else(|| started + FAR_FUTURE);
        let mut backoff = Backoff::new(
            Duration::from_millis(self.config.poll_interval_ms),
            Duration::from_millis(self.config.max_poll_interval_ms),
        );
        let mut probes = 0u32;

        tracing::info!(
            url = %probe.url(),
            timeout_secs = self.config.startup_delay_secs,
            "Polling inference server health"
        );

        loop {
            if let Some(status) = inference.try_wait()? {
                return Err(ReadinessError::InferenceExited {
                    code: exit_code(&status),
                });
            }

            probes += 1;
            let outcome = tokio::select! {
                outcome = probe.check() => outcome,
                reason = shutdown.recv() => return Err(ReadinessError::Interrupted(reason)),
            };

            if outcome.is_healthy() {
                return Ok(ReadinessOutcome::Ready {
                    probes,
                    elapsed: started.elapsed(),
                });
            }
            tracing::debug!(attempt = probes, outcome = ?outcome, "Inference server not ready");

            let now = Instant::now();
            if now >= deadline {
                return Ok(ReadinessOutcome::TimedOut {
                    probes,
                    elapsed: started.elapsed(),
                });
            }

            let pause = backoff.next_delay().min(deadline - now);
            tokio::select! {
                _ = time::sleep(pause) => {}
                status = inference.wait() => {
                    return Err(ReadinessError::InferenceExited {
                        code: exit_code(&status?),
                    });
                }
                reason = shutdown.recv() => return Err(ReadinessError::Interrupted(reason)),
            }
        }
    }
}
