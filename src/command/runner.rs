// ABOUTME: Command runner trait and the tokio::process implementation.
// ABOUTME: Every invocation is bounded by a timeout and killed when it expires.

use super::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Output from a local command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convert a non-zero exit into an error carrying stderr.
    pub fn into_success(self, program: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::NonZeroExit {
                program: program.to_string(),
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external programs on behalf of the CLI-driven backends.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve a program on PATH.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run a program to completion, failing with `CommandTimeout` past `timeout`.
    async fn run(&self, program: &str, args: &[String], timeout: Duration)
    -> Result<CommandOutput>;
}

/// Runs commands on the local host.
#[derive(Debug, Clone, Default)]
pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }

    async fn run_inner(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::NotFound(program.to_string()),
                _ => Error::SpawnFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                },
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        tracing::debug!(program, ?args, ?timeout, "running command");

        // Dropping the future on timeout kills the child via kill_on_drop.
        match tokio::time::timeout(timeout, self.run_inner(program, args)).await {
            Ok(result) => result,
            Err(_) => Err(Error::CommandTimeout {
                program: program.to_string(),
                timeout,
            }),
        }
    }
}
