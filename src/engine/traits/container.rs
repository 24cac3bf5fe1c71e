// ABOUTME: Container operations needed for reclamation.
// ABOUTME: List running containers, stop them, and kill the ones that refuse.

use super::EngineError;
use crate::types::ContainerId;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Container lifecycle operations.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// List currently running containers.
    async fn list_running(&self) -> Result<Vec<RunningContainer>, EngineError>;

    /// Stop a running container, waiting up to `timeout` before the engine kills it.
    async fn stop_container(&self, id: &ContainerId, timeout: Duration)
    -> Result<(), EngineError>;

    /// Kill a container immediately.
    async fn kill_container(&self, id: &ContainerId) -> Result<(), EngineError>;
}

/// A running container as seen by the prober.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunningContainer {
    /// Container ID.
    pub id: ContainerId,
    /// Container name without the leading slash.
    pub name: String,
    /// Image the container runs.
    pub image: String,
}

impl std::fmt::Display for RunningContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id.short())
        } else {
            write!(f, "{} ({})", self.name, self.id.short())
        }
    }
}
