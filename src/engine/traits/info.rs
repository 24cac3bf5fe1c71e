// ABOUTME: Engine reachability and disk usage accounting.
// ABOUTME: Backs the prober's ping and the reporter's usage snapshot.

use super::EngineError;
use async_trait::async_trait;
use serde::Serialize;

/// Engine metadata operations.
#[async_trait]
pub trait EngineInfo: Send + Sync {
    /// Ping the engine to check connectivity.
    async fn ping(&self) -> Result<(), EngineError>;

    /// Disk space accounting (the `system df` view).
    async fn disk_usage(&self) -> Result<DiskUsage, EngineError>;
}

/// One row of the usage table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageRow {
    pub total: usize,
    pub active: usize,
    pub size_bytes: u64,
    pub reclaimable_bytes: u64,
}

/// Disk usage per object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub images: UsageRow,
    pub containers: UsageRow,
    pub volumes: UsageRow,
    pub build_cache: UsageRow,
}

impl DiskUsage {
    /// Rows in display order with their labels.
    pub fn rows(&self) -> [(&'static str, &UsageRow); 4] {
        [
            ("Images", &self.images),
            ("Containers", &self.containers),
            ("Local Volumes", &self.volumes),
            ("Build Cache", &self.build_cache),
        ]
    }
}
