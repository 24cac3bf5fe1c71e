// ABOUTME: Error types for orchestrator (kubectl) operations.
// ABOUTME: Separates unreachable clusters, timeouts, command failures and bad JSON.

use crate::command;
use std::time::Duration;

/// Errors from orchestrator operations.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// kubectl is installed but no cluster answers.
    #[error("cluster unreachable: {0}")]
    Unreachable(String),

    /// A bounded operation ran past its deadline.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// kubectl could not be run or exited non-zero.
    #[error("kubectl failed: {0}")]
    Command(#[from] command::Error),

    /// kubectl output did not match the expected JSON shape.
    #[error("failed to parse kubectl output: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
