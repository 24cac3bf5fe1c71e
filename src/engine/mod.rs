// ABOUTME: Container engine access for Docker and Podman.
// ABOUTME: Detects the engine socket and exposes the bollard-backed Engine traits.

mod bollard;
mod detection;
pub mod traits;
mod types;

pub use self::bollard::BollardEngine;
pub use detection::{DetectionError, detect_local};
pub use traits::{
    ContainerOps, DiskUsage, Engine, EngineError, EngineInfo, PruneOps, PruneOutcome,
    PruneTarget, RunningContainer, UsageRow,
};
pub use types::{EngineConfig, EngineKind, SocketInfo};
