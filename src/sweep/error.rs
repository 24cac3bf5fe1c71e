// ABOUTME: Action error type with SNAFU pattern.
// ABOUTME: Unifies engine, orchestrator and local-cluster failures for the executor.

use snafu::Snafu;

use super::system::SystemKind;
use crate::cluster::ClusterError;
use crate::command;
use crate::engine::EngineError;
use crate::orchestrator::OrchestratorError;

/// Why a single reclaim action failed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ActionError {
    #[snafu(display("container engine: {source}"))]
    Engine { source: EngineError },

    #[snafu(display("orchestrator: {source}"))]
    Orchestrator { source: OrchestratorError },

    #[snafu(display("local cluster: {source}"))]
    Cluster { source: ClusterError },

    #[snafu(display("backend panicked: {message}"))]
    Panicked { message: String },

    #[snafu(display("{failed} of {total} deletions failed, first: {first}"))]
    Partial {
        failed: usize,
        total: usize,
        first: String,
    },

    #[snafu(display("no {system} backend is connected"))]
    Unavailable { system: SystemKind },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionErrorKind {
    /// Backend could not be reached.
    ConnectionFailed,
    /// The object disappeared between probing and execution.
    NotFound,
    /// A bounded call ran past its deadline.
    Timeout,
    /// A CLI exited non-zero or could not be started.
    CommandFailed,
    /// Backend output had an unexpected shape.
    Parse,
    /// Filesystem operation failed.
    Filesystem,
    /// Backend call panicked.
    Panic,
    /// Some but not all items of a batch failed.
    Partial,
    /// Plan referenced a system with no backend.
    Unavailable,
    /// Any other backend failure.
    Backend,
}

impl ActionError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ActionErrorKind {
        match self {
            ActionError::Engine { source } => match source {
                EngineError::ConnectionFailed(_) => ActionErrorKind::ConnectionFailed,
                EngineError::ContainerNotFound(_) | EngineError::NotRunning(_) => {
                    ActionErrorKind::NotFound
                }
                EngineError::PruneInProgress(_) | EngineError::Runtime(_) => {
                    ActionErrorKind::Backend
                }
            },
            ActionError::Orchestrator { source } => match source {
                OrchestratorError::Unreachable(_) => ActionErrorKind::ConnectionFailed,
                OrchestratorError::Timeout { .. } => ActionErrorKind::Timeout,
                OrchestratorError::Command(err) => command_kind(err),
                OrchestratorError::Parse(_) => ActionErrorKind::Parse,
            },
            ActionError::Cluster { source } => match source {
                ClusterError::Command(err) => command_kind(err),
                ClusterError::RemoveDir { .. } | ClusterError::NoHome => {
                    ActionErrorKind::Filesystem
                }
            },
            ActionError::Panicked { .. } => ActionErrorKind::Panic,
            ActionError::Partial { .. } => ActionErrorKind::Partial,
            ActionError::Unavailable { .. } => ActionErrorKind::Unavailable,
        }
    }
}

fn command_kind(err: &command::Error) -> ActionErrorKind {
    if err.is_timeout() {
        ActionErrorKind::Timeout
    } else {
        ActionErrorKind::CommandFailed
    }
}

impl From<EngineError> for ActionError {
    fn from(source: EngineError) -> Self {
        ActionError::Engine { source }
    }
}

impl From<OrchestratorError> for ActionError {
    fn from(source: OrchestratorError) -> Self {
        ActionError::Orchestrator { source }
    }
}

impl From<ClusterError> for ActionError {
    fn from(source: ClusterError) -> Self {
        ActionError::Cluster { source }
    }
}
