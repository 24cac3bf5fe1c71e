// ABOUTME: Reclaim actions: named, idempotent operations scoped to one backing system.
// ABOUTME: Target system, destructiveness and level applicability derive from the kind.

use super::level::CleanupLevel;
use super::system::SystemKind;
use crate::engine::{PruneTarget, RunningContainer};
use crate::orchestrator::{ObjectKind, PodPhase};
use crate::types::NamespaceName;
use serde::Serialize;

const REGULAR_ONLY: &[CleanupLevel] = &[CleanupLevel::Regular];
const AGGRESSIVE_ONLY: &[CleanupLevel] = &[CleanupLevel::Aggressive];
const BOTH: &[CleanupLevel] = &[CleanupLevel::Regular, CleanupLevel::Aggressive];

/// What an action does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "subject")]
pub enum ActionKind {
    // Container engine
    StopContainer(RunningContainer),
    Prune(PruneTarget),

    // Orchestrator
    DeleteEvictedPods,
    DeletePodsInPhase(PodPhase),
    ReportUnusedClaims,
    DeleteNamespace(NamespaceName),
    DeleteNamespaceObjects {
        namespace: NamespaceName,
        kind: ObjectKind,
    },

    // Local cluster manager
    PruneClusterNode,
    ClearImageCache,
    DeleteCluster,
    RemoveLocalDirs,
}

/// A single step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReclaimAction {
    pub kind: ActionKind,
}

impl ReclaimAction {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind }
    }

    pub fn stop(container: RunningContainer) -> Self {
        Self::new(ActionKind::StopContainer(container))
    }

    pub fn prune(target: PruneTarget) -> Self {
        Self::new(ActionKind::Prune(target))
    }

    /// The backing system this action runs against.
    pub fn target(&self) -> SystemKind {
        match self.kind {
            ActionKind::StopContainer(_) | ActionKind::Prune(_) => SystemKind::ContainerEngine,
            ActionKind::DeleteEvictedPods
            | ActionKind::DeletePodsInPhase(_)
            | ActionKind::ReportUnusedClaims
            | ActionKind::DeleteNamespace(_)
            | ActionKind::DeleteNamespaceObjects { .. } => SystemKind::OrchestratorApi,
            ActionKind::PruneClusterNode
            | ActionKind::ClearImageCache
            | ActionKind::DeleteCluster
            | ActionKind::RemoveLocalDirs => SystemKind::LocalClusterManager,
        }
    }

    /// Whether the action touches resources that may be in use.
    pub fn destructive(&self) -> bool {
        match self.kind {
            ActionKind::StopContainer(_)
            | ActionKind::DeleteNamespace(_)
            | ActionKind::DeleteNamespaceObjects { .. }
            | ActionKind::DeleteCluster
            | ActionKind::RemoveLocalDirs => true,
            ActionKind::Prune(target) => matches!(
                target,
                PruneTarget::Images { all: true }
                    | PruneTarget::Volumes { all: true }
                    | PruneTarget::System
            ),
            ActionKind::DeleteEvictedPods
            | ActionKind::DeletePodsInPhase(_)
            | ActionKind::ReportUnusedClaims
            | ActionKind::PruneClusterNode
            | ActionKind::ClearImageCache => false,
        }
    }

    /// Levels at which the policy may schedule this action.
    pub fn levels(&self) -> &'static [CleanupLevel] {
        match self.kind {
            ActionKind::StopContainer(_)
            | ActionKind::DeleteNamespace(_)
            | ActionKind::DeleteNamespaceObjects { .. }
            | ActionKind::DeleteCluster
            | ActionKind::RemoveLocalDirs => AGGRESSIVE_ONLY,
            ActionKind::Prune(target) => match target {
                PruneTarget::Images { all: true }
                | PruneTarget::Volumes { all: true }
                | PruneTarget::BuildCache { all: true }
                | PruneTarget::System => AGGRESSIVE_ONLY,
                _ => BOTH,
            },
            ActionKind::DeleteEvictedPods | ActionKind::DeletePodsInPhase(_) => BOTH,
            ActionKind::ReportUnusedClaims
            | ActionKind::PruneClusterNode
            | ActionKind::ClearImageCache => REGULAR_ONLY,
        }
    }

    pub fn applies_to(&self, level: CleanupLevel) -> bool {
        self.levels().contains(&level)
    }

    pub fn is_stop(&self) -> bool {
        matches!(self.kind, ActionKind::StopContainer(_))
    }

    pub fn is_prune(&self) -> bool {
        matches!(self.kind, ActionKind::Prune(_))
    }

    /// Human-readable description for status lines.
    pub fn description(&self) -> String {
        match &self.kind {
            ActionKind::StopContainer(c) => format!("stop container {c}"),
            ActionKind::Prune(target) => format!("prune {}", target.label()),
            ActionKind::DeleteEvictedPods => "delete evicted pods".to_string(),
            ActionKind::DeletePodsInPhase(phase) => format!("delete {phase} pods"),
            ActionKind::ReportUnusedClaims => "report unused persistent volume claims".to_string(),
            ActionKind::DeleteNamespace(ns) => format!("delete namespace {ns}"),
            ActionKind::DeleteNamespaceObjects { namespace, kind } => {
                format!("delete all {} in {namespace}", kind.label())
            }
            ActionKind::PruneClusterNode => "prune container state inside the cluster node".to_string(),
            ActionKind::ClearImageCache => "clear the local image cache".to_string(),
            ActionKind::DeleteCluster => "delete the local cluster".to_string(),
            ActionKind::RemoveLocalDirs => "remove cache and log directories".to_string(),
        }
    }
}

impl std::fmt::Display for ReclaimAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.target(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContainerId;

    fn container() -> RunningContainer {
        RunningContainer {
            id: ContainerId::new("0123456789abcdef".to_string()),
            name: "web".to_string(),
            image: "nginx".to_string(),
        }
    }

    #[test]
    fn stop_is_aggressive_and_destructive() {
        let action = ReclaimAction::stop(container());
        assert_eq!(action.target(), SystemKind::ContainerEngine);
        assert!(action.destructive());
        assert!(action.applies_to(CleanupLevel::Aggressive));
        assert!(!action.applies_to(CleanupLevel::Regular));
        assert_eq!(action.description(), "stop container web (0123456789ab)");
    }

    #[test]
    fn regular_prunes_are_not_destructive() {
        for target in [
            PruneTarget::StoppedContainers,
            PruneTarget::Images { all: false },
            PruneTarget::Networks,
            PruneTarget::BuildCache { all: false },
            PruneTarget::Volumes { all: false },
        ] {
            let action = ReclaimAction::prune(target);
            assert!(!action.destructive(), "{target:?}");
            assert!(action.applies_to(CleanupLevel::Regular), "{target:?}");
        }
    }

    #[test]
    fn whole_volume_prune_is_aggressive_only() {
        let action = ReclaimAction::prune(PruneTarget::Volumes { all: true });
        assert!(action.destructive());
        assert_eq!(action.levels(), &[CleanupLevel::Aggressive]);
    }

    #[test]
    fn display_names_target() {
        let action = ReclaimAction::new(ActionKind::DeleteCluster);
        assert_eq!(action.to_string(), "[local cluster] delete the local cluster");
    }
}
