// ABOUTME: Bollard-based container engine implementation.
// ABOUTME: Supports both Docker and Podman via the Docker-compatible API.

use crate::engine::traits::{
    ContainerOps, DiskUsage, EngineError, EngineInfo, PruneOps, PruneOutcome, PruneTarget,
    RunningContainer, UsageRow,
};
use crate::engine::types::{EngineKind, SocketInfo};
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::SystemDataUsageResponse;
use bollard::query_parameters::{
    DataUsageOptions, KillContainerOptions, ListContainersOptions, PruneBuildOptions,
    PruneContainersOptions, PruneImagesOptions, PruneNetworksOptions, PruneVolumesOptions,
    StopContainerOptions,
};
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_container_stop_error(e: bollard::errors::Error) -> EngineError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => EngineError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => EngineError::NotRunning(message.clone()),
        _ => EngineError::Runtime(e.to_string()),
    }
}

fn map_container_kill_error(e: bollard::errors::Error) -> EngineError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => EngineError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => EngineError::NotRunning(message.clone()),
        _ => EngineError::Runtime(e.to_string()),
    }
}

fn map_prune_error(e: bollard::errors::Error) -> EngineError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => EngineError::PruneInProgress(message.clone()),
        _ => EngineError::Runtime(e.to_string()),
    }
}

fn filters(key: &str, value: &str) -> HashMap<String, Vec<String>> {
    HashMap::from([(key.to_string(), vec![value.to_string()])])
}

fn bytes(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

// =============================================================================
// BollardEngine
// =============================================================================

/// Container engine implementation using bollard.
pub struct BollardEngine {
    client: Docker,
    kind: EngineKind,
}

impl BollardEngine {
    /// Create a new BollardEngine from a Docker client.
    pub fn new(client: Docker, kind: EngineKind) -> Self {
        Self { client, kind }
    }

    /// Connect to the engine behind a detected socket.
    ///
    /// Connecting does not contact the daemon; use `ping()` to check it answers.
    pub fn connect(socket: &SocketInfo, timeout: Duration) -> Result<Self, EngineError> {
        let client =
            Docker::connect_with_unix(&socket.path, timeout.as_secs(), bollard::API_DEFAULT_VERSION)
                .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, socket.kind))
    }

    /// Get the engine type (Docker or Podman).
    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn prune_containers(&self) -> Result<PruneOutcome, EngineError> {
        let response = self
            .client
            .prune_containers(None::<PruneContainersOptions>)
            .await
            .map_err(map_prune_error)?;

        Ok(PruneOutcome {
            removed: response.containers_deleted.map_or(0, |d| d.len()),
            reclaimed_bytes: bytes(response.space_reclaimed),
        })
    }

    async fn prune_images(&self, all: bool) -> Result<PruneOutcome, EngineError> {
        // dangling=false widens the prune to every image without a container
        let opts = PruneImagesOptions {
            filters: Some(filters("dangling", if all { "false" } else { "true" })),
            ..Default::default()
        };

        let response = self
            .client
            .prune_images(Some(opts))
            .await
            .map_err(map_prune_error)?;

        Ok(PruneOutcome {
            removed: response.images_deleted.map_or(0, |d| d.len()),
            reclaimed_bytes: bytes(response.space_reclaimed),
        })
    }

    async fn prune_networks(&self) -> Result<PruneOutcome, EngineError> {
        let response = self
            .client
            .prune_networks(None::<PruneNetworksOptions>)
            .await
            .map_err(map_prune_error)?;

        Ok(PruneOutcome {
            removed: response.networks_deleted.map_or(0, |d| d.len()),
            reclaimed_bytes: 0,
        })
    }

    async fn prune_volumes(&self, all: bool) -> Result<PruneOutcome, EngineError> {
        // Without all=true the engine only removes anonymous volumes
        let opts = PruneVolumesOptions {
            filters: all.then(|| filters("all", "true")),
            ..Default::default()
        };

        let response = self
            .client
            .prune_volumes(Some(opts))
            .await
            .map_err(map_prune_error)?;

        Ok(PruneOutcome {
            removed: response.volumes_deleted.map_or(0, |d| d.len()),
            reclaimed_bytes: bytes(response.space_reclaimed),
        })
    }

    async fn prune_build_cache(&self, all: bool) -> Result<PruneOutcome, EngineError> {
        let opts = PruneBuildOptions {
            all: Some(all),
            ..Default::default()
        };

        let response = self
            .client
            .prune_build(Some(opts))
            .await
            .map_err(map_prune_error)?;

        Ok(PruneOutcome {
            removed: response.caches_deleted.map_or(0, |d| d.len()),
            reclaimed_bytes: bytes(response.space_reclaimed),
        })
    }

    /// Every prune in dependency order, continuing past failures.
    async fn prune_system(&self) -> Result<PruneOutcome, EngineError> {
        let steps = [
            PruneTarget::StoppedContainers,
            PruneTarget::Images { all: true },
            PruneTarget::Networks,
            PruneTarget::Volumes { all: true },
            PruneTarget::BuildCache { all: true },
        ];

        let mut total = PruneOutcome::default();
        let mut failures = Vec::new();

        for step in steps {
            match self.prune(step).await {
                Ok(outcome) => total = total.merge(outcome),
                Err(e) => failures.push(format!("{}: {}", step.label(), e)),
            }
        }

        if failures.is_empty() {
            Ok(total)
        } else {
            Err(EngineError::Runtime(failures.join("; ")))
        }
    }
}

#[async_trait]
impl EngineInfo for BollardEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.client
            .ping()
            .await
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    async fn disk_usage(&self) -> Result<DiskUsage, EngineError> {
        let response = self
            .client
            .df(None::<DataUsageOptions>)
            .await
            .map_err(|e| EngineError::Runtime(e.to_string()))?;

        Ok(summarize_usage(response))
    }
}

fn count(value: Option<i64>) -> usize {
    value.unwrap_or(0).max(0) as usize
}

fn usage_row(
    total: Option<i64>,
    active: Option<i64>,
    size: Option<i64>,
    reclaimable: Option<i64>,
) -> UsageRow {
    UsageRow {
        total: count(total),
        active: count(active),
        size_bytes: bytes(size),
        reclaimable_bytes: bytes(reclaimable),
    }
}

/// Map the per-type summaries of a `system df` response onto rows.
fn summarize_usage(response: SystemDataUsageResponse) -> DiskUsage {
    let mut usage = DiskUsage::default();

    if let Some(images) = response.images_disk_usage {
        usage.images = usage_row(
            images.total_count,
            images.active_count,
            images.total_size,
            images.reclaimable,
        );
    }
    if let Some(containers) = response.containers_disk_usage {
        usage.containers = usage_row(
            containers.total_count,
            containers.active_count,
            containers.total_size,
            containers.reclaimable,
        );
    }
    if let Some(volumes) = response.volumes_disk_usage {
        usage.volumes = usage_row(
            volumes.total_count,
            volumes.active_count,
            volumes.total_size,
            volumes.reclaimable,
        );
    }
    if let Some(cache) = response.build_cache_disk_usage {
        usage.build_cache = usage_row(
            cache.total_count,
            cache.active_count,
            cache.total_size,
            cache.reclaimable,
        );
    }

    usage
}

#[async_trait]
impl ContainerOps for BollardEngine {
    async fn list_running(&self) -> Result<Vec<RunningContainer>, EngineError> {
        let opts = ListContainersOptions {
            all: false,
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| EngineError::Runtime(e.to_string()))?;

        Ok(containers
            .into_iter()
            .map(|c| {
                let name = c
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default();

                RunningContainer {
                    id: ContainerId::new(c.id.unwrap_or_default()),
                    name,
                    image: c.image.unwrap_or_default(),
                }
            })
            .filter(|c| !c.id.as_str().is_empty())
            .collect())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        let opts = StopContainerOptions {
            t: Some(timeout.as_secs() as i32),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn kill_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        self.client
            .kill_container(id.as_str(), None::<KillContainerOptions>)
            .await
            .map_err(map_container_kill_error)
    }
}

#[async_trait]
impl PruneOps for BollardEngine {
    async fn prune(&self, target: PruneTarget) -> Result<PruneOutcome, EngineError> {
        tracing::debug!(engine = %self.kind, target = target.label(), "pruning");

        match target {
            PruneTarget::StoppedContainers => self.prune_containers().await,
            PruneTarget::Images { all } => self.prune_images(all).await,
            PruneTarget::Networks => self.prune_networks().await,
            PruneTarget::BuildCache { all } => self.prune_build_cache(all).await,
            PruneTarget::Volumes { all } => self.prune_volumes(all).await,
            PruneTarget::System => self.prune_system().await,
        }
    }
}
