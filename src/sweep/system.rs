// ABOUTME: Backing systems and the immutable capability record built by probing.
// ABOUTME: Availability is decided once per run and never mutated afterwards.

use crate::cluster::ClusterState;
use crate::engine::RunningContainer;
use crate::types::NamespaceName;
use serde::Serialize;

/// A manageable subsystem that owns reclaimable resources.
///
/// Variant order is execution order: the orchestrator and local cluster
/// usually run on top of the container engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemKind {
    ContainerEngine,
    OrchestratorApi,
    LocalClusterManager,
}

impl SystemKind {
    pub const ALL: [SystemKind; 3] = [
        SystemKind::ContainerEngine,
        SystemKind::OrchestratorApi,
        SystemKind::LocalClusterManager,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SystemKind::ContainerEngine => "container engine",
            SystemKind::OrchestratorApi => "orchestrator",
            SystemKind::LocalClusterManager => "local cluster",
        }
    }
}

impl std::fmt::Display for SystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a backing system can be used this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum Availability {
    /// Not installed, or nothing configured to manage.
    Absent,
    /// Installed but not answering its status query.
    Unreachable(String),
    /// Present and responsive.
    Available,
}

/// One backing system as detected by the prober.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackingSystem {
    pub kind: SystemKind,
    /// Tool behind the system (`docker`, `podman`, `kubectl`, `minikube`).
    pub name: String,
    pub availability: Availability,
}

impl BackingSystem {
    pub fn absent(kind: SystemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            availability: Availability::Absent,
        }
    }

    pub fn unreachable(
        kind: SystemKind,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            availability: Availability::Unreachable(reason.into()),
        }
    }

    pub fn available_as(kind: SystemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            availability: Availability::Available,
        }
    }

    pub fn available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Everything the policy needs to know about the host, captured once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub engine: BackingSystem,
    pub orchestrator: BackingSystem,
    pub local_cluster: BackingSystem,
    /// Running containers at probe time (engine available only).
    pub running_containers: Vec<RunningContainer>,
    /// Live namespaces at probe time (orchestrator available only).
    pub namespaces: Vec<NamespaceName>,
    /// Local cluster host state (local cluster available only).
    pub cluster_state: Option<ClusterState>,
}

impl Capabilities {
    /// A host with nothing installed.
    pub fn none() -> Self {
        Self {
            engine: BackingSystem::absent(SystemKind::ContainerEngine, "docker"),
            orchestrator: BackingSystem::absent(SystemKind::OrchestratorApi, "kubectl"),
            local_cluster: BackingSystem::absent(SystemKind::LocalClusterManager, "minikube"),
            running_containers: Vec::new(),
            namespaces: Vec::new(),
            cluster_state: None,
        }
    }

    pub fn with_engine(mut self, running: Vec<RunningContainer>) -> Self {
        self.engine = BackingSystem::available_as(SystemKind::ContainerEngine, self.engine.name);
        self.running_containers = running;
        self
    }

    pub fn with_orchestrator(mut self, namespaces: Vec<NamespaceName>) -> Self {
        self.orchestrator =
            BackingSystem::available_as(SystemKind::OrchestratorApi, self.orchestrator.name);
        self.namespaces = namespaces;
        self
    }

    pub fn with_local_cluster(mut self, state: ClusterState) -> Self {
        self.local_cluster =
            BackingSystem::available_as(SystemKind::LocalClusterManager, self.local_cluster.name);
        self.cluster_state = Some(state);
        self
    }

    /// Replace one system's record, e.g. to mark it unreachable.
    pub fn with_system(mut self, system: BackingSystem) -> Self {
        match system.kind {
            SystemKind::ContainerEngine => self.engine = system,
            SystemKind::OrchestratorApi => self.orchestrator = system,
            SystemKind::LocalClusterManager => self.local_cluster = system,
        }
        self
    }

    pub fn system(&self, kind: SystemKind) -> &BackingSystem {
        match kind {
            SystemKind::ContainerEngine => &self.engine,
            SystemKind::OrchestratorApi => &self.orchestrator,
            SystemKind::LocalClusterManager => &self.local_cluster,
        }
    }

    /// The three systems in execution order.
    pub fn systems(&self) -> [&BackingSystem; 3] {
        [&self.engine, &self.orchestrator, &self.local_cluster]
    }

    pub fn is_available(&self, kind: SystemKind) -> bool {
        self.system(kind).available()
    }

    pub fn any_available(&self) -> bool {
        self.systems().iter().any(|s| s.available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_nothing_available() {
        let caps = Capabilities::none();
        assert!(!caps.any_available());
        for kind in SystemKind::ALL {
            assert_eq!(caps.system(kind).availability, Availability::Absent);
        }
    }

    #[test]
    fn unreachable_is_not_available() {
        let caps = Capabilities::none().with_system(BackingSystem::unreachable(
            SystemKind::OrchestratorApi,
            "kubectl",
            "connection refused",
        ));
        assert!(!caps.is_available(SystemKind::OrchestratorApi));
        assert!(!caps.any_available());
    }

    #[test]
    fn builders_mark_systems_available() {
        let caps = Capabilities::none()
            .with_engine(vec![])
            .with_local_cluster(ClusterState::Stopped);
        assert!(caps.is_available(SystemKind::ContainerEngine));
        assert!(caps.is_available(SystemKind::LocalClusterManager));
        assert!(!caps.is_available(SystemKind::OrchestratorApi));
        assert_eq!(caps.engine.name(), "docker");
    }

    #[test]
    fn kinds_sort_in_execution_order() {
        let mut kinds = vec![
            SystemKind::LocalClusterManager,
            SystemKind::ContainerEngine,
            SystemKind::OrchestratorApi,
        ];
        kinds.sort();
        assert_eq!(kinds, SystemKind::ALL.to_vec());
    }
}
