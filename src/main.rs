//! vLLM launcher
//!
//! Starts a vLLM OpenAI-compatible inference server, waits for it, then starts
//! the API adapter that proxies to it. The launcher exits when the adapter
//! does, with the adapter's exit code.
//!
//! # Architecture Overview
//!
//! ```text
//!   env / TOML / CLI
//!         │
//!         ▼
//!   ┌───────────┐     ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//!   │  config   │────▶│   process    │────▶│   health    │────▶│  lifecycle   │
//!   │ resolve + │     │ CommandSpec  │     │ fixed delay │     │  supervisor  │
//!   │ validate  │     │ inference +  │     │  or /health │     │ exit code    │
//!   └───────────┘     │   adapter    │     │   polling   │     └──────────────┘
//!                     └──────────────┘     └─────────────┘            ▲
//!                                                                     │
//!                                                SIGINT/SIGTERM ──────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use vllm_launcher::config::{self, ConfigError, LauncherConfig, Overrides, ReadinessMode, SupervisionPolicy};
use vllm_launcher::lifecycle::signals::spawn_signal_forwarder;
use vllm_launcher::observability::{init_logging, log_config};
use vllm_launcher::{Launcher, Shutdown};

#[derive(Parser)]
#[command(name = "vllm-launcher", version)]
#[command(about = "Start a vLLM inference server and the API adapter in front of it", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "LAUNCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Readiness mode: `fixed` (sleep VLLM_STARTUP_DELAY) or `poll`.
    #[arg(long)]
    readiness: Option<ReadinessMode>,

    /// What to do when the inference server exits: `none`, `exit` or `restart`.
    #[arg(long)]
    supervision: Option<SupervisionPolicy>,

    /// Print the resolved launch plan as JSON and exit without spawning.
    #[arg(long)]
    dry_run: bool,
}

fn resolve_config(cli: &Cli) -> Result<LauncherConfig, ConfigError> {
    let overrides = Overrides {
        readiness: cli.readiness,
        supervision: cli.supervision,
    };
    config::from_env(cli.config.as_deref(), &overrides)
}

fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);
    tracing::info!("vllm-launcher v{} starting", env!("CARGO_PKG_VERSION"));
    log_config(&config);

    let launcher = Launcher::new(config);

    if cli.dry_run {
        return match serde_json::to_string_pretty(&launcher.plan()) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to render launch plan");
                ExitCode::FAILURE
            }
        };
    }

    let shutdown = Shutdown::new();
    let listener = shutdown.subscribe();
    spawn_signal_forwarder(shutdown.clone());

    match launcher.run(listener).await {
        Ok(outcome) => to_exit_code(outcome.exit_code),
        Err(e) => {
            tracing::error!(error = %e, "Launch failed");
            ExitCode::FAILURE
        }
    }
}
