// ABOUTME: Typed views of the kubectl JSON the reclaimer reads.
// ABOUTME: Pods, persistent volume claims and namespaces, plus evicted/unused selection.

use crate::types::{NamespaceName, PodName};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `kubectl get ... -o json` list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Pod lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl PodPhase {
    /// Phases whose pods will never run again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub phase: Option<PodPhase>,
    /// Set by the kubelet, e.g. `Evicted` for resource-pressure evictions.
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default)]
    pub volumes: Vec<PodVolume>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodVolume {
    #[serde(default)]
    pub persistent_volume_claim: Option<ClaimSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSource {
    pub claim_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

/// The status reason the kubelet sets on evicted pods.
pub const EVICTED_REASON: &str = "Evicted";

impl Pod {
    pub fn phase(&self) -> Option<PodPhase> {
        self.status.phase
    }

    /// Evicted pods are Failed pods whose status reason is `Evicted`.
    pub fn is_evicted(&self) -> bool {
        self.status.phase == Some(PodPhase::Failed)
            && self.status.reason.as_deref() == Some(EVICTED_REASON)
    }

    /// Namespace/name reference, `None` when either part is missing or invalid.
    pub fn reference(&self) -> Option<PodRef> {
        let namespace = NamespaceName::new(self.metadata.namespace.as_deref()?).ok()?;
        if self.metadata.name.is_empty() {
            return None;
        }
        Some(PodRef {
            namespace,
            name: PodName::new(self.metadata.name.clone()),
        })
    }

    fn claim_names(&self) -> impl Iterator<Item = &str> {
        self.spec
            .volumes
            .iter()
            .filter_map(|v| v.persistent_volume_claim.as_ref())
            .map(|c| c.claim_name.as_str())
    }
}

/// A pod addressed by namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PodRef {
    pub namespace: NamespaceName,
    pub name: PodName,
}

impl std::fmt::Display for PodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Select the evicted subset of `pods`.
///
/// Matches the status reason explicitly: a Failed pod without the `Evicted`
/// reason is a normal failure, and Succeeded pods are never evicted.
pub fn select_evicted(pods: &[Pod]) -> Vec<PodRef> {
    pods.iter()
        .filter(|p| p.is_evicted())
        .filter_map(Pod::reference)
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatus {
    #[serde(default)]
    pub phase: Option<String>,
}

/// A persistent volume claim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claim {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: ClaimStatus,
}

/// A claim no pod mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedClaim {
    pub namespace: String,
    pub name: String,
    pub phase: Option<String>,
}

impl std::fmt::Display for UnusedClaim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)?;
        if let Some(ref phase) = self.phase {
            write!(f, " ({phase})")?;
        }
        Ok(())
    }
}

/// Claims not referenced by any pod in their namespace.
///
/// Pods in terminal phases still count as references: their claims are
/// released only when the pod object is deleted.
pub fn unused_claims(claims: &[Claim], pods: &[Pod]) -> Vec<UnusedClaim> {
    let mounted: HashSet<(&str, &str)> = pods
        .iter()
        .flat_map(|p| {
            let ns = p.metadata.namespace.as_deref().unwrap_or("default");
            p.claim_names().map(move |c| (ns, c))
        })
        .collect();

    claims
        .iter()
        .filter_map(|c| {
            let ns = c.metadata.namespace.as_deref().unwrap_or("default");
            (!mounted.contains(&(ns, c.metadata.name.as_str()))).then(|| UnusedClaim {
                namespace: ns.to_string(),
                name: c.metadata.name.clone(),
                phase: c.status.phase.clone(),
            })
        })
        .collect()
}

/// A namespace as listed by kubectl.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Namespace {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(ns: &str, name: &str, phase: &str, reason: Option<&str>) -> Pod {
        let json = serde_json::json!({
            "metadata": { "name": name, "namespace": ns },
            "status": { "phase": phase, "reason": reason },
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn evicted_requires_failed_phase_and_reason() {
        let pods = vec![
            pod("default", "evicted", "Failed", Some("Evicted")),
            pod("default", "crashed", "Failed", Some("Error")),
            pod("default", "done", "Succeeded", Some("Evicted")),
            pod("default", "live", "Running", None),
        ];

        let evicted = select_evicted(&pods);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].to_string(), "default/evicted");
    }

    #[test]
    fn unknown_phase_parses() {
        let p = pod("default", "odd", "Terminating", None);
        assert_eq!(p.phase(), Some(PodPhase::Unknown));
        assert!(!p.is_evicted());
    }

    #[test]
    fn terminal_phases() {
        assert!(PodPhase::Succeeded.is_terminal());
        assert!(PodPhase::Failed.is_terminal());
        assert!(!PodPhase::Running.is_terminal());
        assert!(!PodPhase::Pending.is_terminal());
    }

    #[test]
    fn unused_claims_respect_namespace() {
        let claims: ObjectList<Claim> = serde_json::from_value(serde_json::json!({
            "items": [
                { "metadata": { "name": "data", "namespace": "a" }, "status": { "phase": "Bound" } },
                { "metadata": { "name": "data", "namespace": "b" }, "status": { "phase": "Bound" } },
            ]
        }))
        .unwrap();
        let pods: ObjectList<Pod> = serde_json::from_value(serde_json::json!({
            "items": [{
                "metadata": { "name": "db", "namespace": "a" },
                "spec": { "volumes": [{ "name": "v", "persistentVolumeClaim": { "claimName": "data" } }] },
                "status": { "phase": "Running" }
            }]
        }))
        .unwrap();

        let unused = unused_claims(&claims.items, &pods.items);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].to_string(), "b/data (Bound)");
    }
}
