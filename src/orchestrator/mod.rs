// ABOUTME: Kubernetes orchestrator access through kubectl.
// ABOUTME: Exposes the OrchestratorOps trait, typed resources and namespace protection.

mod error;
mod kubectl;
mod namespaces;
mod resources;

pub use error::{OrchestratorError, Result};
pub use kubectl::{Kubectl, ObjectKind, OrchestratorConfig, OrchestratorOps, count_deleted};
pub use namespaces::{PROTECTED_NAMESPACES, ProtectedNamespaces};
pub use resources::{
    Claim, EVICTED_REASON, ObjectList, Pod, PodPhase, PodRef, UnusedClaim, select_evicted,
    unused_claims,
};
