// ABOUTME: Reclaim executor: runs a plan in order and records every outcome.
// ABOUTME: The single catch-and-record boundary; no failure or panic aborts the sweep.

use super::action::{ActionKind, ReclaimAction};
use super::backends::Backends;
use super::error::{ActionError, ActionErrorKind};
use super::policy::Plan;
use super::report::format_bytes;
use super::system::SystemKind;
use crate::cluster::{LocalClusterOps, parse_reclaimed_space};
use crate::engine::{Engine, PruneTarget, RunningContainer};
use crate::orchestrator::{
    ObjectKind, OrchestratorOps, PodPhase, select_evicted, unused_claims,
};
use crate::output::Output;
use crate::types::NamespaceName;
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

/// In-node prune run through the local cluster manager.
pub const NODE_PRUNE_COMMAND: [&str; 5] = ["docker", "system", "prune", "-f", "--volumes"];

/// Outcome of one action.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub action: ReclaimAction,
    pub succeeded: bool,
    pub detail: String,
    /// Items worth listing individually (e.g. unused claims).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reclaimed_bytes: Option<u64>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ActionErrorKind>,
}

/// What a successful action produced.
#[derive(Debug, Default)]
struct Done {
    detail: String,
    notes: Vec<String>,
    reclaimed_bytes: Option<u64>,
}

impl Done {
    fn detail(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            ..Default::default()
        }
    }
}

/// Runs plans against connected backends.
pub struct Executor<'a> {
    backends: &'a Backends,
    stop_timeout: Duration,
}

impl<'a> Executor<'a> {
    pub fn new(backends: &'a Backends, stop_timeout: Duration) -> Self {
        Self {
            backends,
            stop_timeout,
        }
    }

    /// Run every action in plan order, printing each outcome as it lands.
    pub async fn run(&self, plan: &Plan, output: &Output) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(plan.actions.len());
        for action in &plan.actions {
            output.progress(&format!("--> {action}"));
            let result = self.execute(action).await;
            if result.succeeded {
                output.success(&format!("{}: {}", action.description(), result.detail));
            } else {
                output.error(&format!("{}: {}", action.description(), result.detail));
            }
            for note in &result.notes {
                output.info(&format!("  {note}"));
            }
            results.push(result);
        }
        results
    }

    /// Run a single action, converting errors and panics into a failed result.
    pub async fn execute(&self, action: &ReclaimAction) -> ExecutionResult {
        tracing::info!(%action, "starting action");
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.dispatch(action))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(ActionError::Panicked {
                    message: panic_message(payload.as_ref()),
                })
            });
        let duration = started.elapsed();

        match outcome {
            Ok(done) => {
                tracing::info!(%action, detail = %done.detail, ?duration, "action finished");
                ExecutionResult {
                    action: action.clone(),
                    succeeded: true,
                    detail: done.detail,
                    notes: done.notes,
                    reclaimed_bytes: done.reclaimed_bytes,
                    duration,
                    error_kind: None,
                }
            }
            Err(e) => {
                tracing::warn!(%action, error = %e, "action failed");
                ExecutionResult {
                    action: action.clone(),
                    succeeded: false,
                    detail: e.to_string(),
                    notes: Vec::new(),
                    reclaimed_bytes: None,
                    duration,
                    error_kind: Some(e.kind()),
                }
            }
        }
    }

    async fn dispatch(&self, action: &ReclaimAction) -> Result<Done, ActionError> {
        match &action.kind {
            ActionKind::StopContainer(container) => self.stop(container).await,
            ActionKind::Prune(target) => self.prune(*target).await,
            ActionKind::DeleteEvictedPods => self.delete_evicted().await,
            ActionKind::DeletePodsInPhase(phase) => self.delete_phase(*phase).await,
            ActionKind::ReportUnusedClaims => self.report_claims().await,
            ActionKind::DeleteNamespace(ns) => self.delete_namespace(ns).await,
            ActionKind::DeleteNamespaceObjects { namespace, kind } => {
                self.delete_objects(namespace, *kind).await
            }
            ActionKind::PruneClusterNode => self.prune_node().await,
            ActionKind::ClearImageCache => self.clear_cache().await,
            ActionKind::DeleteCluster => {
                self.cluster()?.delete_cluster().await?;
                Ok(Done::detail("local cluster deleted"))
            }
            ActionKind::RemoveLocalDirs => {
                let removed = self.cluster()?.remove_local_dirs().await?;
                Ok(Done {
                    detail: format!(
                        "removed {} director{}",
                        removed.len(),
                        plural_y(removed.len())
                    ),
                    notes: removed.iter().map(|p| p.display().to_string()).collect(),
                    reclaimed_bytes: None,
                })
            }
        }
    }

    fn engine(&self) -> Result<&dyn Engine, ActionError> {
        self.backends
            .engine
            .get()
            .ok_or(ActionError::Unavailable {
                system: SystemKind::ContainerEngine,
            })
    }

    fn orchestrator(&self) -> Result<&dyn OrchestratorOps, ActionError> {
        self.backends
            .orchestrator
            .get()
            .ok_or(ActionError::Unavailable {
                system: SystemKind::OrchestratorApi,
            })
    }

    fn cluster(&self) -> Result<&dyn LocalClusterOps, ActionError> {
        self.backends
            .local_cluster
            .get()
            .ok_or(ActionError::Unavailable {
                system: SystemKind::LocalClusterManager,
            })
    }

    async fn stop(&self, container: &RunningContainer) -> Result<Done, ActionError> {
        let engine = self.engine()?;
        match engine.stop_container(&container.id, self.stop_timeout).await {
            Ok(()) => Ok(Done::detail("stopped")),
            Err(stop_err) => {
                tracing::debug!(container = %container, error = %stop_err, "stop failed, killing");
                match engine.kill_container(&container.id).await {
                    Ok(()) => Ok(Done::detail(format!("stop failed ({stop_err}), killed instead"))),
                    Err(kill_err) => {
                        tracing::debug!(container = %container, error = %kill_err, "kill failed");
                        Err(stop_err.into())
                    }
                }
            }
        }
    }

    async fn prune(&self, target: PruneTarget) -> Result<Done, ActionError> {
        let outcome = self.engine()?.prune(target).await?;
        Ok(Done {
            detail: format!(
                "removed {} object{}, reclaimed {}",
                outcome.removed,
                plural_s(outcome.removed),
                format_bytes(outcome.reclaimed_bytes)
            ),
            notes: Vec::new(),
            reclaimed_bytes: Some(outcome.reclaimed_bytes),
        })
    }

    async fn delete_evicted(&self) -> Result<Done, ActionError> {
        let orchestrator = self.orchestrator()?;
        let pods = orchestrator.list_pods().await?;
        let evicted = select_evicted(&pods);
        if evicted.is_empty() {
            return Ok(Done::detail("no evicted pods"));
        }

        let total = evicted.len();
        let mut failures = Vec::new();
        for pod in &evicted {
            if let Err(e) = orchestrator.delete_pod(pod).await {
                tracing::debug!(%pod, error = %e, "evicted pod deletion failed");
                failures.push(format!("{pod}: {e}"));
            }
        }

        match failures.first() {
            None => Ok(Done::detail(format!(
                "deleted {total} evicted pod{}",
                plural_s(total)
            ))),
            Some(first) => Err(ActionError::Partial {
                failed: failures.len(),
                total,
                first: first.clone(),
            }),
        }
    }

    async fn delete_phase(&self, phase: PodPhase) -> Result<Done, ActionError> {
        let deleted = self.orchestrator()?.delete_pods_in_phase(phase).await?;
        Ok(Done::detail(format!(
            "deleted {deleted} {phase} pod{}",
            plural_s(deleted)
        )))
    }

    async fn report_claims(&self) -> Result<Done, ActionError> {
        let orchestrator = self.orchestrator()?;
        let claims = orchestrator.list_claims().await?;
        let pods = orchestrator.list_pods().await?;
        let unused = unused_claims(&claims, &pods);

        Ok(Done {
            detail: match unused.len() {
                0 => "no unused persistent volume claims".to_string(),
                n => format!(
                    "{n} unused persistent volume claim{} (not deleted)",
                    plural_s(n)
                ),
            },
            notes: unused.iter().map(ToString::to_string).collect(),
            reclaimed_bytes: None,
        })
    }

    async fn delete_namespace(&self, namespace: &NamespaceName) -> Result<Done, ActionError> {
        self.orchestrator()?.delete_namespace(namespace).await?;
        Ok(Done::detail(format!("namespace {namespace} deleted")))
    }

    async fn delete_objects(
        &self,
        namespace: &NamespaceName,
        kind: ObjectKind,
    ) -> Result<Done, ActionError> {
        let deleted = self.orchestrator()?.delete_all(namespace, kind).await?;
        Ok(Done::detail(format!(
            "deleted {deleted} object{}",
            plural_s(deleted)
        )))
    }

    async fn prune_node(&self) -> Result<Done, ActionError> {
        let stdout = self.cluster()?.exec_in_node(&NODE_PRUNE_COMMAND).await?;
        let reclaimed = parse_reclaimed_space(&stdout);
        Ok(Done {
            detail: match reclaimed {
                Some(bytes) => format!("reclaimed {}", format_bytes(bytes)),
                None => "node pruned".to_string(),
            },
            notes: Vec::new(),
            reclaimed_bytes: reclaimed,
        })
    }

    async fn clear_cache(&self) -> Result<Done, ActionError> {
        let cluster = self.cluster()?;
        let images = cluster.list_cached_images().await?;
        if images.is_empty() {
            return Ok(Done::detail("image cache already empty"));
        }
        cluster.delete_cached_images(&images).await?;
        Ok(Done {
            detail: format!(
                "removed {} cached image{}",
                images.len(),
                plural_s(images.len())
            ),
            notes: images,
            reclaimed_bytes: None,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}
