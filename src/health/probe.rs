//! HTTP health probe against the inference server.
//!
//! # Responsibilities
//! - Issue a single GET against the configured health path
//! - Classify the outcome (healthy, unhealthy status, connection error, timeout)

use std::time::Duration;

use url::Url;

use crate::config::{LauncherConfig, ReadinessConfig};

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Status(u16),
    Unreachable(String),
    Timeout,
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }
}

pub struct HealthProbe {
    url: Url,
    client: reqwest::Client,
}

impl HealthProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent("vllm-launcher-readiness")
            .build()?;

        Ok(Self { url, client })
    }

    /// Probe for the inference server described by `config`.
    pub fn for_inference(config: &LauncherConfig) -> Result<Self, crate::health::ReadinessError> {
        let url = health_url(config.inference.port, &config.readiness)?;
        let timeout = Duration::from_millis(config.readiness.probe_timeout_ms);
        Ok(Self::new(url, timeout)?)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn check(&self) -> ProbeOutcome {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Healthy,
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(e) if e.is_timeout() => ProbeOutcome::Timeout,
            Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        }
    }
}

/// `http://localhost:<port><health_path>`.
pub fn health_url(port: u16, readiness: &ReadinessConfig) -> Result<Url, url::ParseError> {
    let base = Url::parse(&format!("http://localhost:{}", port))?;
    base.join(&readiness.health_path)
}
