// ABOUTME: Composable capability traits for the container engine.
// ABOUTME: Defines ContainerOps, PruneOps, EngineInfo and the combined Engine bound.

mod container;
mod info;
mod prune;

pub use container::{ContainerOps, RunningContainer};
pub use info::{DiskUsage, EngineInfo, UsageRow};
pub use prune::{PruneOps, PruneOutcome, PruneTarget};

/// Every capability the reclaimer needs from an engine.
///
/// Automatically implemented for any type providing all capability traits.
pub trait Engine: ContainerOps + PruneOps + EngineInfo {}

impl<T: ContainerOps + PruneOps + EngineInfo> Engine for T {}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("container not running: {0}")]
    NotRunning(String),

    #[error("a prune operation is already running: {0}")]
    PruneInProgress(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
