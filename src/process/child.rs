//! Owned handle over a spawned child process.
//!
//! # Responsibilities
//! - Spawn a [`CommandSpec`] with inherited stdout/stderr and its chosen stdin
//! - Wait for, poll, and terminate the child
//! - Map exit statuses to shell-style exit codes
//!
//! # Design Decisions
//! - Children are killed when the handle is dropped, so no child outlives an
//!   orderly launcher exit
//! - Termination is SIGKILL via tokio; the engine and adapter hold no state
//!   that needs flushing on the way down

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::process::command::{CommandSpec, StdinMode};
use crate::process::ProcessError;

/// A running child plus the spec it was started from.
#[derive(Debug)]
pub struct ManagedChild {
    spec: CommandSpec,
    child: Child,
    pid: Option<u32>,
}

impl ManagedChild {
    /// Start `spec`. Spawn failure is reported, never retried.
    pub fn spawn(spec: &CommandSpec) -> Result<Self, ProcessError> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .envs(&spec.env)
            .stdin(match spec.stdin {
                StdinMode::Null => Stdio::null(),
                StdinMode::Inherit => Stdio::inherit(),
            })
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                name: spec.name,
                program: spec.program.clone(),
                source,
            })?;

        let pid = child.id();
        tracing::info!(child = spec.name, pid = ?pid, command = %spec, "Child process started");

        Ok(Self {
            spec: spec.clone(),
            child,
            pid,
        })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// OS process id, captured at spawn time.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the child to exit. Cancel-safe.
    pub async fn wait(&mut self) -> Result<ExitStatus, ProcessError> {
        self.child.wait().await.map_err(|source| ProcessError::Wait {
            name: self.spec.name,
            source,
        })
    }

    /// Exit status if the child has already exited.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        self.child.try_wait().map_err(|source| ProcessError::Wait {
            name: self.spec.name,
            source,
        })
    }

    /// Kill the child and reap it, giving up after `grace`.
    ///
    /// Returns the exit status when the child was reaped in time.
    pub async fn terminate(&mut self, grace: Duration) -> Option<ExitStatus> {
        if let Ok(Some(status)) = self.child.try_wait() {
            return Some(status);
        }

        if let Err(e) = self.child.start_kill() {
            tracing::warn!(child = self.spec.name, error = %e, "Failed to signal child");
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(child = self.spec.name, status = %status, "Child process stopped");
                Some(status)
            }
            Ok(Err(e)) => {
                tracing::warn!(child = self.spec.name, error = %e, "Failed to reap child");
                None
            }
            Err(_) => {
                tracing::warn!(
                    child = self.spec.name,
                    grace_secs = grace.as_secs(),
                    "Child did not exit within grace period"
                );
                None
            }
        }
    }
}

/// Shell-style exit code: the process code, or `128 + signal` when killed.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
