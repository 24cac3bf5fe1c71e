// ABOUTME: Connected backend handles for the three backing systems.
// ABOUTME: Wires config and host detection into engine, kubectl and minikube clients.

use crate::cluster::{LocalClusterOps, Minikube};
use crate::command::CommandRunner;
use crate::config::Config;
use crate::engine::{BollardEngine, DetectionError, Engine, detect_local};
use crate::orchestrator::{Kubectl, OrchestratorOps};
use std::sync::Arc;

/// One backend slot as found on the host, before any status query.
pub enum Connection<T: ?Sized> {
    /// Binary or socket not found.
    Missing { name: String },
    /// Found but a client could not be built.
    Failed { name: String, reason: String },
    /// Client ready for probing.
    Ready { name: String, backend: Box<T> },
}

impl<T: ?Sized> Connection<T> {
    pub fn ready(name: impl Into<String>, backend: Box<T>) -> Self {
        Connection::Ready {
            name: name.into(),
            backend,
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Connection::Missing { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Connection::Missing { name }
            | Connection::Failed { name, .. }
            | Connection::Ready { name, .. } => name,
        }
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Connection::Ready { backend, .. } => Some(backend.as_ref()),
            _ => None,
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connection::Missing { name } => write!(f, "Missing({name})"),
            Connection::Failed { name, reason } => write!(f, "Failed({name}: {reason})"),
            Connection::Ready { name, .. } => write!(f, "Ready({name})"),
        }
    }
}

/// Backend handles for a single run.
#[derive(Debug)]
pub struct Backends {
    pub engine: Connection<dyn Engine>,
    pub orchestrator: Connection<dyn OrchestratorOps>,
    pub local_cluster: Connection<dyn LocalClusterOps>,
}

impl Backends {
    /// No backends at all.
    pub fn none() -> Self {
        Self {
            engine: Connection::missing("docker"),
            orchestrator: Connection::missing("kubectl"),
            local_cluster: Connection::missing("minikube"),
        }
    }

    /// Locate every backend on this host.
    ///
    /// Never fails: anything missing ends up as [`Connection::Missing`] and is
    /// treated as absent by the prober.
    pub fn connect(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            engine: connect_engine(config),
            orchestrator: connect_orchestrator(config, runner.clone()),
            local_cluster: connect_local_cluster(config, runner),
        }
    }
}

fn connect_engine(config: &Config) -> Connection<dyn Engine> {
    let fallback_name = config
        .engine
        .runtime
        .map(|k| k.to_string())
        .unwrap_or_else(|| "docker".to_string());

    let socket = match detect_local(&config.engine) {
        Ok(socket) => socket,
        Err(DetectionError::NoSocketFound) => {
            tracing::debug!("no container engine socket found");
            return Connection::missing(fallback_name);
        }
        Err(e) => {
            tracing::warn!(error = %e, "container engine detection failed");
            return Connection::missing(fallback_name);
        }
    };

    let name = socket.kind.to_string();
    match BollardEngine::connect(&socket, config.engine.timeout) {
        Ok(engine) => {
            tracing::debug!(engine = %name, socket = %socket.path, "engine client created");
            Connection::ready(name, Box::new(engine) as Box<dyn Engine>)
        }
        Err(e) => Connection::Failed {
            name,
            reason: e.to_string(),
        },
    }
}

fn connect_orchestrator(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> Connection<dyn OrchestratorOps> {
    let name = config.orchestrator.binary.clone();
    let kubectl = Kubectl::new(runner, config.orchestrator.clone(), config.status_timeout);
    match kubectl.locate() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "found orchestrator CLI");
            Connection::ready(name, Box::new(kubectl) as Box<dyn OrchestratorOps>)
        }
        None => Connection::missing(name),
    }
}

fn connect_local_cluster(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> Connection<dyn LocalClusterOps> {
    let name = config.local_cluster.binary.clone();
    let minikube = Minikube::new(runner, config.local_cluster.clone(), config.status_timeout);
    match minikube.locate() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "found local cluster CLI");
            Connection::ready(name, Box::new(minikube) as Box<dyn LocalClusterOps>)
        }
        None => Connection::missing(name),
    }
}
