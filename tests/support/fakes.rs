// ABOUTME: In-memory fakes for the engine, orchestrator and local cluster traits.
// ABOUTME: All three share one call log so tests can assert cross-system ordering.

use async_trait::async_trait;
use parking_lot::Mutex;
use reclaim::cluster::{self, ClusterError, ClusterState, LocalClusterOps};
use reclaim::command;
use reclaim::engine::{
    ContainerOps, DiskUsage, Engine, EngineError, EngineInfo, PruneOps, PruneOutcome, PruneTarget,
    RunningContainer, UsageRow,
};
use reclaim::orchestrator::{
    self, Claim, ObjectKind, OrchestratorError, OrchestratorOps, Pod, PodPhase, PodRef,
};
use reclaim::sweep::{Backends, Connection};
use reclaim::types::{ContainerId, NamespaceName};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Shared, ordered record of mutating and querying calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().push(call.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Entries that start with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == call)
    }
}

pub fn container(name: &str) -> RunningContainer {
    RunningContainer {
        id: ContainerId::new(format!("{name}0123456789abcdef")),
        name: name.to_string(),
        image: "alpine:3".to_string(),
    }
}

pub fn namespace(name: &str) -> NamespaceName {
    NamespaceName::new(name).unwrap()
}

pub fn pod(ns: &str, name: &str, phase: &str, reason: Option<&str>) -> Pod {
    serde_json::from_value(serde_json::json!({
        "metadata": { "name": name, "namespace": ns },
        "status": { "phase": phase, "reason": reason },
    }))
    .unwrap()
}

pub fn pod_with_claim(ns: &str, name: &str, claim: &str) -> Pod {
    serde_json::from_value(serde_json::json!({
        "metadata": { "name": name, "namespace": ns },
        "spec": { "volumes": [{ "name": "data", "persistentVolumeClaim": { "claimName": claim } }] },
        "status": { "phase": "Running" },
    }))
    .unwrap()
}

pub fn claim(ns: &str, name: &str) -> Claim {
    serde_json::from_value(serde_json::json!({
        "metadata": { "name": name, "namespace": ns },
        "status": { "phase": "Bound" },
    }))
    .unwrap()
}

/// Container engine fake. Running containers disappear when stopped or killed.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    pub log: CallLog,
    running: Arc<Mutex<Vec<RunningContainer>>>,
    pub unreachable: bool,
    pub failing_stops: HashSet<String>,
    pub failing_kills: HashSet<String>,
    pub failing_prunes: HashSet<PruneTarget>,
    pub panicking_prunes: HashSet<PruneTarget>,
    pub usage_fails: bool,
}

impl FakeEngine {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn with_running(self, containers: Vec<RunningContainer>) -> Self {
        *self.running.lock() = containers;
        self
    }

    pub fn running(&self) -> Vec<RunningContainer> {
        self.running.lock().clone()
    }

    fn remove(&self, id: &ContainerId) {
        self.running.lock().retain(|c| &c.id != id);
    }
}

#[async_trait]
impl ContainerOps for FakeEngine {
    async fn list_running(&self) -> Result<Vec<RunningContainer>, EngineError> {
        Ok(self.running())
    }

    async fn stop_container(&self, id: &ContainerId, _timeout: Duration) -> Result<(), EngineError> {
        self.log.push(format!("engine stop {}", id.short()));
        if self.failing_stops.contains(id.as_str()) {
            return Err(EngineError::Runtime("stop timed out".to_string()));
        }
        self.remove(id);
        Ok(())
    }

    async fn kill_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        self.log.push(format!("engine kill {}", id.short()));
        if self.failing_kills.contains(id.as_str()) {
            return Err(EngineError::Runtime("kill refused".to_string()));
        }
        self.remove(id);
        Ok(())
    }
}

#[async_trait]
impl PruneOps for FakeEngine {
    async fn prune(&self, target: PruneTarget) -> Result<PruneOutcome, EngineError> {
        self.log.push(format!("engine prune {}", target.label()));
        if self.panicking_prunes.contains(&target) {
            panic!("prune {} exploded", target.label());
        }
        if self.failing_prunes.contains(&target) {
            return Err(EngineError::PruneInProgress("another prune is running".to_string()));
        }
        Ok(PruneOutcome {
            removed: 1,
            reclaimed_bytes: 1_000,
        })
    }
}

#[async_trait]
impl EngineInfo for FakeEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        if self.unreachable {
            return Err(EngineError::ConnectionFailed("connection refused".to_string()));
        }
        Ok(())
    }

    async fn disk_usage(&self) -> Result<DiskUsage, EngineError> {
        self.log.push("engine df");
        if self.usage_fails {
            return Err(EngineError::Runtime("df failed".to_string()));
        }
        Ok(DiskUsage {
            images: UsageRow {
                total: 2,
                active: 1,
                size_bytes: 2_000_000,
                reclaimable_bytes: 1_000_000,
            },
            ..Default::default()
        })
    }
}

/// Orchestrator fake backed by fixed listings.
#[derive(Debug, Clone, Default)]
pub struct FakeOrchestrator {
    pub log: CallLog,
    pub unreachable: Option<String>,
    pub namespaces: Vec<NamespaceName>,
    pub namespace_listing_fails: bool,
    pub pods: Vec<Pod>,
    pub claims: Vec<Claim>,
    pub timing_out_namespaces: HashSet<String>,
    pub failing_pods: HashSet<String>,
}

impl FakeOrchestrator {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }
}

#[async_trait]
impl OrchestratorOps for FakeOrchestrator {
    async fn check_reachable(&self) -> orchestrator::Result<()> {
        match &self.unreachable {
            Some(reason) => Err(OrchestratorError::Unreachable(reason.clone())),
            None => Ok(()),
        }
    }

    async fn list_namespaces(&self) -> orchestrator::Result<Vec<NamespaceName>> {
        if self.namespace_listing_fails {
            return Err(OrchestratorError::Command(command::Error::NonZeroExit {
                program: "kubectl".to_string(),
                code: Some(1),
                stderr: "forbidden".to_string(),
            }));
        }
        Ok(self.namespaces.clone())
    }

    async fn list_pods(&self) -> orchestrator::Result<Vec<Pod>> {
        Ok(self.pods.clone())
    }

    async fn list_claims(&self) -> orchestrator::Result<Vec<Claim>> {
        self.log.push("kubectl list claims");
        Ok(self.claims.clone())
    }

    async fn delete_pods_in_phase(&self, phase: PodPhase) -> orchestrator::Result<usize> {
        self.log.push(format!("kubectl delete pods {phase}"));
        Ok(self.pods.iter().filter(|p| p.phase() == Some(phase)).count())
    }

    async fn delete_pod(&self, pod: &PodRef) -> orchestrator::Result<()> {
        self.log.push(format!("kubectl delete pod {pod}"));
        if self.failing_pods.contains(&pod.to_string()) {
            return Err(OrchestratorError::Unreachable("connection reset".to_string()));
        }
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &NamespaceName) -> orchestrator::Result<()> {
        self.log.push(format!("kubectl delete namespace {namespace}"));
        if self.timing_out_namespaces.contains(namespace.as_str()) {
            return Err(OrchestratorError::Timeout {
                operation: format!("delete namespace {namespace}"),
                timeout: Duration::from_secs(60),
            });
        }
        Ok(())
    }

    async fn delete_all(&self, namespace: &NamespaceName, kind: ObjectKind) -> orchestrator::Result<usize> {
        self.log
            .push(format!("kubectl delete {} in {namespace}", kind.resource()));
        Ok(0)
    }
}

/// Local cluster fake.
#[derive(Debug, Clone, Default)]
pub struct FakeCluster {
    pub log: CallLog,
    pub state: Option<ClusterState>,
    pub status_fails: bool,
    pub cached_images: Vec<String>,
    pub prune_output: String,
}

impl FakeCluster {
    pub fn new(log: CallLog, state: Option<ClusterState>) -> Self {
        Self {
            log,
            state,
            prune_output: "Total reclaimed space: 2.5GB\n".to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LocalClusterOps for FakeCluster {
    async fn status(&self) -> cluster::Result<Option<ClusterState>> {
        if self.status_fails {
            return Err(ClusterError::Command(command::Error::CommandTimeout {
                program: "minikube".to_string(),
                timeout: Duration::from_secs(15),
            }));
        }
        Ok(self.state)
    }

    async fn exec_in_node(&self, command: &[&str]) -> cluster::Result<String> {
        self.log.push(format!("minikube ssh {}", command.join(" ")));
        Ok(self.prune_output.clone())
    }

    async fn list_cached_images(&self) -> cluster::Result<Vec<String>> {
        self.log.push("minikube cache list");
        Ok(self.cached_images.clone())
    }

    async fn delete_cached_images(&self, images: &[String]) -> cluster::Result<()> {
        self.log.push(format!("minikube cache delete {}", images.join(" ")));
        Ok(())
    }

    async fn delete_cluster(&self) -> cluster::Result<()> {
        self.log.push("minikube delete");
        Ok(())
    }

    async fn remove_local_dirs(&self) -> cluster::Result<Vec<PathBuf>> {
        self.log.push("minikube remove dirs");
        Ok(vec![PathBuf::from("/home/test/.minikube/cache")])
    }
}

/// Backends with the given fakes; `None` leaves the slot missing.
pub fn backends(
    engine: Option<FakeEngine>,
    orchestrator: Option<FakeOrchestrator>,
    cluster: Option<FakeCluster>,
) -> Backends {
    let mut backends = Backends::none();
    if let Some(engine) = engine {
        backends.engine = Connection::ready("docker", Box::new(engine) as Box<dyn Engine>);
    }
    if let Some(orchestrator) = orchestrator {
        backends.orchestrator = Connection::ready("kubectl", Box::new(orchestrator) as Box<dyn OrchestratorOps>);
    }
    if let Some(cluster) = cluster {
        backends.local_cluster = Connection::ready("minikube", Box::new(cluster) as Box<dyn LocalClusterOps>);
    }
    backends
}
