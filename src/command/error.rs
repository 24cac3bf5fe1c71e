// ABOUTME: Command execution error types.
// ABOUTME: Covers missing binaries, spawn failures, timeouts, and non-zero exits.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: command not found")]
    NotFound(String),

    #[error("failed to start {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("{program} timed out after {timeout:?}")]
    CommandTimeout { program: String, timeout: Duration },

    #[error("{program} exited with {}: {stderr}", describe_exit(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl Error {
    /// Whether the failure was the deadline rather than the command itself.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::CommandTimeout { .. })
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
