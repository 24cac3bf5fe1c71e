// ABOUTME: Policy selector mapping a cleanup level and capability record to a plan.
// ABOUTME: Pure and deterministic: the same inputs always yield the same actions.

use super::action::{ActionKind, ReclaimAction};
use super::level::CleanupLevel;
use super::system::{Availability, Capabilities, SystemKind};
use crate::cluster::ClusterState;
use crate::engine::PruneTarget;
use crate::orchestrator::{ObjectKind, PodPhase, ProtectedNamespaces};
use crate::types::NamespaceName;
use serde::Serialize;

/// Why a system contributes no actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum SkipReason {
    /// Installed but not answering; reported as a warning.
    Unreachable(String),
    /// Available, but the level has nothing to do for its current state.
    NothingToDo(String),
}

/// A per-system note explaining a skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
    pub system: SystemKind,
    pub name: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl Skip {
    pub fn is_warning(&self) -> bool {
        matches!(self.reason, SkipReason::Unreachable(_))
    }
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            SkipReason::Unreachable(reason) => write!(
                f,
                "{} ({}) is installed but unreachable, skipping: {reason}",
                self.system, self.name
            ),
            SkipReason::NothingToDo(why) => write!(f, "{} ({}): {why}", self.system, self.name),
        }
    }
}

/// Ordered actions plus skip notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub level: CleanupLevel,
    pub actions: Vec<ReclaimAction>,
    pub skipped: Vec<Skip>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn destructive_count(&self) -> usize {
        self.actions.iter().filter(|a| a.destructive()).count()
    }
}

/// Level-to-action mapping.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    protected: ProtectedNamespaces,
}

impl Policy {
    pub fn new(protected: ProtectedNamespaces) -> Self {
        Self { protected }
    }

    pub fn protected(&self) -> &ProtectedNamespaces {
        &self.protected
    }

    /// Build the plan for `level`.
    ///
    /// Actions are grouped by system in execution order: container engine,
    /// orchestrator, local cluster. Absent systems are left out silently,
    /// unreachable ones produce a warning skip.
    pub fn plan(&self, level: CleanupLevel, caps: &Capabilities) -> Plan {
        let mut actions = Vec::new();
        let mut skipped = Vec::new();

        for kind in SystemKind::ALL {
            let system = caps.system(kind);
            match &system.availability {
                Availability::Absent => continue,
                Availability::Unreachable(reason) => {
                    skipped.push(Skip {
                        system: kind,
                        name: system.name.clone(),
                        reason: SkipReason::Unreachable(reason.clone()),
                    });
                    continue;
                }
                Availability::Available => {}
            }

            let before = actions.len();
            match kind {
                SystemKind::ContainerEngine => engine_actions(level, caps, &mut actions),
                SystemKind::OrchestratorApi => {
                    self.orchestrator_actions(level, &caps.namespaces, &mut actions)
                }
                SystemKind::LocalClusterManager => {
                    local_cluster_actions(level, caps.cluster_state, &mut actions)
                }
            }

            if actions.len() == before {
                skipped.push(Skip {
                    system: kind,
                    name: system.name.clone(),
                    reason: SkipReason::NothingToDo(idle_reason(kind, caps)),
                });
            }
        }

        debug_assert!(actions.iter().all(|a| a.applies_to(level)));

        Plan {
            level,
            actions,
            skipped,
        }
    }

    fn orchestrator_actions(
        &self,
        level: CleanupLevel,
        namespaces: &[NamespaceName],
        actions: &mut Vec<ReclaimAction>,
    ) {
        actions.push(ReclaimAction::new(ActionKind::DeleteEvictedPods));
        actions.push(ReclaimAction::new(ActionKind::DeletePodsInPhase(
            PodPhase::Succeeded,
        )));
        actions.push(ReclaimAction::new(ActionKind::DeletePodsInPhase(
            PodPhase::Failed,
        )));

        match level {
            CleanupLevel::Regular => {
                actions.push(ReclaimAction::new(ActionKind::ReportUnusedClaims));
            }
            CleanupLevel::Aggressive => {
                actions.extend(
                    self.protected
                        .deletable(namespaces)
                        .into_iter()
                        .map(|ns| ReclaimAction::new(ActionKind::DeleteNamespace(ns))),
                );

                let default = NamespaceName::default_namespace();
                for kind in [
                    ObjectKind::Workloads,
                    ObjectKind::PersistentVolumeClaims,
                    ObjectKind::ConfigMaps,
                    ObjectKind::Secrets,
                ] {
                    actions.push(ReclaimAction::new(ActionKind::DeleteNamespaceObjects {
                        namespace: default.clone(),
                        kind,
                    }));
                }
            }
        }
    }
}

fn engine_actions(level: CleanupLevel, caps: &Capabilities, actions: &mut Vec<ReclaimAction>) {
    match level {
        CleanupLevel::Regular => {
            for target in [
                PruneTarget::StoppedContainers,
                PruneTarget::Images { all: false },
                PruneTarget::Networks,
                PruneTarget::BuildCache { all: false },
                PruneTarget::Volumes { all: false },
            ] {
                actions.push(ReclaimAction::prune(target));
            }
        }
        CleanupLevel::Aggressive => {
            actions.extend(caps.running_containers.iter().cloned().map(ReclaimAction::stop));
            for target in [
                PruneTarget::StoppedContainers,
                PruneTarget::Images { all: true },
                PruneTarget::Networks,
                PruneTarget::BuildCache { all: true },
                PruneTarget::Volumes { all: true },
                PruneTarget::System,
            ] {
                actions.push(ReclaimAction::prune(target));
            }
        }
    }
}

fn local_cluster_actions(
    level: CleanupLevel,
    state: Option<ClusterState>,
    actions: &mut Vec<ReclaimAction>,
) {
    let Some(state) = state else {
        return;
    };

    let kinds = match (level, state) {
        (CleanupLevel::Regular, ClusterState::Running) => {
            vec![ActionKind::PruneClusterNode, ActionKind::ClearImageCache]
        }
        (CleanupLevel::Regular, ClusterState::Stopped) => Vec::new(),
        (CleanupLevel::Aggressive, ClusterState::Running) => vec![ActionKind::DeleteCluster],
        (CleanupLevel::Aggressive, ClusterState::Stopped) => vec![ActionKind::RemoveLocalDirs],
    };
    actions.extend(kinds.into_iter().map(ReclaimAction::new));
}

fn idle_reason(kind: SystemKind, caps: &Capabilities) -> String {
    match (kind, caps.cluster_state) {
        (SystemKind::LocalClusterManager, Some(ClusterState::Stopped)) => {
            "cluster is stopped, nothing to clean at this level".to_string()
        }
        _ => "nothing to do at this level".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunningContainer;
    use crate::sweep::system::BackingSystem;
    use crate::types::ContainerId;

    fn running(name: &str) -> RunningContainer {
        RunningContainer {
            id: ContainerId::new(format!("{name}-0123456789")),
            name: name.to_string(),
            image: "alpine".to_string(),
        }
    }

    fn ns(names: &[&str]) -> Vec<NamespaceName> {
        names.iter().map(|n| NamespaceName::new(n).unwrap()).collect()
    }

    #[test]
    fn regular_engine_plan_is_five_prunes() {
        let caps = Capabilities::none().with_engine(vec![running("web")]);
        let plan = Policy::default().plan(CleanupLevel::Regular, &caps);

        assert_eq!(plan.len(), 5);
        assert!(plan.actions.iter().all(|a| a.is_prune()));
        assert!(!plan.actions.iter().any(|a| {
            a.kind == ActionKind::Prune(PruneTarget::Volumes { all: true })
        }));
        assert_eq!(plan.destructive_count(), 0);
    }

    #[test]
    fn aggressive_engine_stops_before_prunes() {
        let caps = Capabilities::none().with_engine(vec![running("a"), running("b")]);
        let plan = Policy::default().plan(CleanupLevel::Aggressive, &caps);

        assert!(plan.actions[0].is_stop());
        assert!(plan.actions[1].is_stop());
        assert!(plan.actions[2..].iter().all(|a| a.is_prune()));
        assert_eq!(
            plan.actions.last().map(|a| &a.kind),
            Some(&ActionKind::Prune(PruneTarget::System))
        );
    }

    #[test]
    fn aggressive_keeps_protected_namespaces() {
        let caps = Capabilities::none().with_orchestrator(ns(&[
            "default",
            "kube-system",
            "team-a",
            "kube-public",
            "kube-node-lease",
        ]));
        let plan = Policy::default().plan(CleanupLevel::Aggressive, &caps);

        let deleted: Vec<_> = plan
            .actions
            .iter()
            .filter_map(|a| match &a.kind {
                ActionKind::DeleteNamespace(ns) => Some(ns.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deleted, vec!["team-a"]);
    }

    #[test]
    fn regular_orchestrator_reports_claims_last() {
        let caps = Capabilities::none().with_orchestrator(ns(&["default"]));
        let plan = Policy::default().plan(CleanupLevel::Regular, &caps);

        assert_eq!(
            plan.actions.iter().map(|a| a.kind.clone()).collect::<Vec<_>>(),
            vec![
                ActionKind::DeleteEvictedPods,
                ActionKind::DeletePodsInPhase(PodPhase::Succeeded),
                ActionKind::DeletePodsInPhase(PodPhase::Failed),
                ActionKind::ReportUnusedClaims,
            ]
        );
    }

    #[test]
    fn unreachable_system_is_skipped_with_warning() {
        let caps = Capabilities::none()
            .with_engine(Vec::new())
            .with_system(BackingSystem::unreachable(
                SystemKind::OrchestratorApi,
                "kubectl",
                "connection refused",
            ));
        let plan = Policy::default().plan(CleanupLevel::Regular, &caps);

        assert!(
            plan.actions
                .iter()
                .all(|a| a.target() == SystemKind::ContainerEngine)
        );
        assert_eq!(plan.skipped.len(), 1);
        assert!(plan.skipped[0].is_warning());
    }

    #[test]
    fn stopped_cluster_regular_is_noop() {
        let caps = Capabilities::none().with_local_cluster(ClusterState::Stopped);
        let plan = Policy::default().plan(CleanupLevel::Regular, &caps);

        assert!(plan.is_empty());
        assert_eq!(plan.skipped.len(), 1);
        assert!(!plan.skipped[0].is_warning());
    }

    #[test]
    fn cluster_actions_follow_state() {
        let policy = Policy::default();
        let running = Capabilities::none().with_local_cluster(ClusterState::Running);
        let stopped = Capabilities::none().with_local_cluster(ClusterState::Stopped);

        assert_eq!(
            policy.plan(CleanupLevel::Aggressive, &running).actions,
            vec![ReclaimAction::new(ActionKind::DeleteCluster)]
        );
        assert_eq!(
            policy.plan(CleanupLevel::Aggressive, &stopped).actions,
            vec![ReclaimAction::new(ActionKind::RemoveLocalDirs)]
        );
        assert_eq!(
            policy.plan(CleanupLevel::Regular, &running).actions,
            vec![
                ReclaimAction::new(ActionKind::PruneClusterNode),
                ReclaimAction::new(ActionKind::ClearImageCache),
            ]
        );
    }
}
