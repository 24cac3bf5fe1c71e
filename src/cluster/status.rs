// ABOUTME: Typed parsing of `minikube status -o json`.
// ABOUTME: Maps the host state to Running/Stopped, or no cluster when nonexistent.

use serde::{Deserialize, Serialize};

/// Host state of the local cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterState {
    Running,
    Stopped,
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterState::Running => write!(f, "running"),
            ClusterState::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NodeStatus {
    #[serde(rename = "Host", default)]
    host: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusDocument {
    Single(NodeStatus),
    // Multi-node clusters report one entry per node, control plane first
    Nodes(Vec<NodeStatus>),
}

/// Parse status output. `None` means no local cluster exists.
pub fn parse_status(stdout: &str) -> Option<ClusterState> {
    let document: StatusDocument = match serde_json::from_str(stdout.trim()) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!("unparseable minikube status: {e}");
            return None;
        }
    };

    let host = match document {
        StatusDocument::Single(node) => node.host,
        StatusDocument::Nodes(nodes) => nodes.into_iter().next()?.host,
    };

    match host.as_str() {
        "Running" => Some(ClusterState::Running),
        "" | "Nonexistent" => None,
        // Stopped, Paused, Error... nothing inside the VM is reachable
        _ => Some(ClusterState::Stopped),
    }
}
