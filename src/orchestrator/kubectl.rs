// ABOUTME: Orchestrator operations trait and its kubectl implementation.
// ABOUTME: Reads are JSON-typed; deletions carry a kubectl timeout and a hard deadline.

use super::error::{OrchestratorError, Result};
use super::resources::{Claim, Namespace, ObjectList, Pod, PodPhase, PodRef};
use crate::command::{self, CommandOutput, CommandRunner};
use crate::types::NamespaceName;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Extra time the process deadline allows beyond kubectl's own timeout.
const DEADLINE_GRACE: Duration = Duration::from_secs(5);

/// Orchestrator section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// kubectl binary name or path.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// kubeconfig context to use instead of the current one.
    #[serde(default)]
    pub context: Option<String>,

    /// Upper bound for each delete operation.
    #[serde(default = "default_delete_timeout", with = "humantime_serde")]
    pub delete_timeout: Duration,

    /// Namespaces protected in addition to the built-in system namespaces.
    #[serde(default)]
    pub protected_namespaces: Vec<NamespaceName>,
}

fn default_binary() -> String {
    "kubectl".to_string()
}

fn default_delete_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            binary: default_binary(),
            context: None,
            delete_timeout: default_delete_timeout(),
            protected_namespaces: Vec::new(),
        }
    }
}

/// Kinds of objects swept out of the default namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// The `all` category: pods, services, deployments, replica sets, jobs...
    Workloads,
    PersistentVolumeClaims,
    ConfigMaps,
    Secrets,
}

impl ObjectKind {
    /// Resource name as kubectl expects it.
    pub fn resource(&self) -> &'static str {
        match self {
            ObjectKind::Workloads => "all",
            ObjectKind::PersistentVolumeClaims => "persistentvolumeclaims",
            ObjectKind::ConfigMaps => "configmaps",
            ObjectKind::Secrets => "secrets",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Workloads => "workloads",
            ObjectKind::PersistentVolumeClaims => "persistent volume claims",
            ObjectKind::ConfigMaps => "config maps",
            ObjectKind::Secrets => "secrets",
        }
    }
}

/// Orchestrator operations used by the prober and executor.
#[async_trait]
pub trait OrchestratorOps: Send + Sync {
    /// Check that a cluster answers (the `cluster-info` no-op).
    async fn check_reachable(&self) -> Result<()>;

    /// List namespace names.
    async fn list_namespaces(&self) -> Result<Vec<NamespaceName>>;

    /// List pods across all namespaces.
    async fn list_pods(&self) -> Result<Vec<Pod>>;

    /// List persistent volume claims across all namespaces.
    async fn list_claims(&self) -> Result<Vec<Claim>>;

    /// Delete every pod in `phase` across all namespaces. Returns the count deleted.
    async fn delete_pods_in_phase(&self, phase: PodPhase) -> Result<usize>;

    /// Delete a single pod.
    async fn delete_pod(&self, pod: &PodRef) -> Result<()>;

    /// Delete a whole namespace.
    async fn delete_namespace(&self, namespace: &NamespaceName) -> Result<()>;

    /// Delete every object of `kind` in `namespace`. Returns the count deleted.
    async fn delete_all(&self, namespace: &NamespaceName, kind: ObjectKind) -> Result<usize>;
}

/// kubectl-backed orchestrator client.
pub struct Kubectl {
    runner: Arc<dyn CommandRunner>,
    config: OrchestratorConfig,
    status_timeout: Duration,
}

impl Kubectl {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        config: OrchestratorConfig,
        status_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            config,
            status_timeout,
        }
    }

    /// Resolve the kubectl binary on PATH.
    pub fn locate(&self) -> Option<PathBuf> {
        self.runner.locate(&self.config.binary)
    }

    fn args(&self, rest: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(rest.len() + 2);
        if let Some(ref context) = self.config.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args.extend(rest.iter().map(|s| s.to_string()));
        args
    }

    async fn run(
        &self,
        operation: &str,
        args: Vec<String>,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let deadline = timeout + DEADLINE_GRACE;
        let output = self
            .runner
            .run(&self.config.binary, &args, deadline)
            .await
            .map_err(|e| match e {
                command::Error::CommandTimeout { .. } => OrchestratorError::Timeout {
                    operation: operation.to_string(),
                    timeout,
                },
                other => OrchestratorError::Command(other),
            })?;

        if !output.success() && output.stderr.contains("timed out") {
            return Err(OrchestratorError::Timeout {
                operation: operation.to_string(),
                timeout,
            });
        }

        Ok(output.into_success(&self.config.binary)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, rest: &[&str]) -> Result<T> {
        let request_timeout = format!("--request-timeout={}", go_duration(self.status_timeout));
        let mut args = self.args(rest);
        args.push("-o".to_string());
        args.push("json".to_string());
        args.push(request_timeout);

        let output = self.run(operation, args, self.status_timeout).await?;
        Ok(serde_json::from_str(&output.stdout)?)
    }

    async fn delete(&self, operation: &str, rest: &[&str]) -> Result<usize> {
        let timeout = self.config.delete_timeout;
        let mut args = self.args(rest);
        args.push(format!("--timeout={}", go_duration(timeout)));

        tracing::debug!(operation, ?args, "kubectl delete");
        let output = self.run(operation, args, timeout).await?;
        Ok(count_deleted(&output.stdout))
    }
}

/// Count `<kind> "<name>" deleted` lines in kubectl delete output.
///
/// Newer kubectl appends `from <ns> namespace` after the verb.
pub fn count_deleted(stdout: &str) -> usize {
    stdout.lines().filter(|l| l.contains("\" deleted")).count()
}

/// Render a duration the way kubectl flags parse it.
///
/// Whole seconds stay `Ns`; anything finer goes out as milliseconds, never below `1ms`
/// since kubectl treats zero as no limit.
pub fn go_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 && !d.is_zero() {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis().max(1))
    }
}

#[async_trait]
impl OrchestratorOps for Kubectl {
    async fn check_reachable(&self) -> Result<()> {
        let request_timeout = format!("--request-timeout={}", go_duration(self.status_timeout));
        let args = self.args(&["cluster-info", &request_timeout]);

        match self.run("cluster-info", args, self.status_timeout).await {
            Ok(_) => Ok(()),
            Err(OrchestratorError::Command(command::Error::NonZeroExit { stderr, .. })) => {
                let reason = stderr
                    .lines()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or("no cluster context configured")
                    .trim()
                    .to_string();
                Err(OrchestratorError::Unreachable(reason))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceName>> {
        let list: ObjectList<Namespace> = self
            .get_json("list namespaces", &["get", "namespaces"])
            .await?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| match NamespaceName::new(&ns.metadata.name) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!(name = %ns.metadata.name, "ignoring namespace: {e}");
                    None
                }
            })
            .collect())
    }

    async fn list_pods(&self) -> Result<Vec<Pod>> {
        let list: ObjectList<Pod> = self
            .get_json("list pods", &["get", "pods", "--all-namespaces"])
            .await?;
        Ok(list.items)
    }

    async fn list_claims(&self) -> Result<Vec<Claim>> {
        let list: ObjectList<Claim> = self
            .get_json("list claims", &["get", "persistentvolumeclaims", "--all-namespaces"])
            .await?;
        Ok(list.items)
    }

    async fn delete_pods_in_phase(&self, phase: PodPhase) -> Result<usize> {
        let selector = format!("--field-selector=status.phase=={}", phase.as_str());
        self.delete(
            &format!("delete {phase} pods"),
            &["delete", "pods", "--all-namespaces", &selector],
        )
        .await
    }

    async fn delete_pod(&self, pod: &PodRef) -> Result<()> {
        self.delete(
            &format!("delete pod {pod}"),
            &["delete", "pod", pod.name.as_str(), "-n", pod.namespace.as_str()],
        )
        .await?;
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &NamespaceName) -> Result<()> {
        self.delete(
            &format!("delete namespace {namespace}"),
            &["delete", "namespace", namespace.as_str()],
        )
        .await?;
        Ok(())
    }

    async fn delete_all(&self, namespace: &NamespaceName, kind: ObjectKind) -> Result<usize> {
        self.delete(
            &format!("delete {} in {namespace}", kind.label()),
            &["delete", kind.resource(), "--all", "-n", namespace.as_str()],
        )
        .await
    }
}
