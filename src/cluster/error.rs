// ABOUTME: Error types for local-cluster (minikube) operations.
// ABOUTME: Wraps command failures and filesystem errors on the minikube home.

use crate::command;
use std::path::PathBuf;

/// Errors from local-cluster operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("minikube failed: {0}")]
    Command(#[from] command::Error),

    #[error("failed to remove {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot determine minikube home directory")]
    NoHome,
}

pub type Result<T> = std::result::Result<T, ClusterError>;
