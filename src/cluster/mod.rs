// ABOUTME: Local cluster manager access through minikube.
// ABOUTME: Exposes the LocalClusterOps trait, status parsing and on-disk cleanup.

mod error;
mod minikube;
mod status;

pub use error::{ClusterError, Result};
pub use minikube::{
    LOCAL_DIRS, LocalClusterConfig, LocalClusterOps, Minikube, parse_reclaimed_space,
    remove_dirs,
};
pub use status::{ClusterState, parse_status};
