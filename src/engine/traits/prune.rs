// ABOUTME: Prune operations for the container engine.
// ABOUTME: Each prune kind maps to one engine endpoint, System runs them all.

use super::EngineError;
use async_trait::async_trait;
use serde::Serialize;

/// What to prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PruneTarget {
    /// Stopped containers.
    StoppedContainers,
    /// Dangling images, or every image not used by a container when `all`.
    Images { all: bool },
    /// Networks not used by any container.
    Networks,
    /// Build cache not in use.
    BuildCache { all: bool },
    /// Anonymous unused volumes, or every unused volume (named too) when `all`.
    Volumes { all: bool },
    /// Full system pass: containers, all images, networks, all volumes, all build cache.
    System,
}

impl PruneTarget {
    /// Short human label.
    pub fn label(&self) -> &'static str {
        match self {
            PruneTarget::StoppedContainers => "stopped containers",
            PruneTarget::Images { all: false } => "dangling images",
            PruneTarget::Images { all: true } => "all unused images",
            PruneTarget::Networks => "unused networks",
            PruneTarget::BuildCache { all: false } => "build cache",
            PruneTarget::BuildCache { all: true } => "all build cache",
            PruneTarget::Volumes { all: false } => "unreferenced volumes",
            PruneTarget::Volumes { all: true } => "all unused volumes",
            PruneTarget::System => "full system",
        }
    }
}

/// What a prune removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneOutcome {
    /// Number of objects removed.
    pub removed: usize,
    /// Bytes reclaimed as reported by the engine.
    pub reclaimed_bytes: u64,
}

impl PruneOutcome {
    /// Combine two outcomes.
    pub fn merge(self, other: PruneOutcome) -> PruneOutcome {
        PruneOutcome {
            removed: self.removed + other.removed,
            reclaimed_bytes: self.reclaimed_bytes + other.reclaimed_bytes,
        }
    }
}

/// Prune operations.
#[async_trait]
pub trait PruneOps: Send + Sync {
    /// Prune one kind of unused object.
    async fn prune(&self, target: PruneTarget) -> Result<PruneOutcome, EngineError>;
}
