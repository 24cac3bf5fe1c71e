// ABOUTME: Capability prober: decides which backing systems are usable this run.
// ABOUTME: Side-effect free; only status queries and listings are issued.

use super::backends::{Backends, Connection};
use super::system::{Availability, BackingSystem, Capabilities, SystemKind};
use crate::diagnostics::{Diagnostics, Warning};

/// Probe every backend and build the immutable capability record.
pub async fn probe(backends: &Backends, diagnostics: &mut Diagnostics) -> Capabilities {
    let mut caps = Capabilities::none();

    caps = match &backends.engine {
        Connection::Ready { name, backend } => match backend.ping().await {
            Ok(()) => match backend.list_running().await {
                Ok(running) => {
                    tracing::debug!(engine = %name, running = running.len(), "engine available");
                    mark_available(caps.with_engine(running), SystemKind::ContainerEngine, name)
                }
                Err(e) => mark_unreachable(caps, SystemKind::ContainerEngine, name, e.to_string()),
            },
            Err(e) => mark_unreachable(caps, SystemKind::ContainerEngine, name, e.to_string()),
        },
        other => not_ready(caps, SystemKind::ContainerEngine, other),
    };

    caps = match &backends.orchestrator {
        Connection::Ready { name, backend } => match backend.check_reachable().await {
            Ok(()) => {
                let namespaces = match backend.list_namespaces().await {
                    Ok(namespaces) => namespaces,
                    Err(e) => {
                        diagnostics.warn(Warning::probe_degraded(format!(
                            "could not list namespaces, continuing without them: {e}"
                        )));
                        Vec::new()
                    }
                };
                tracing::debug!(namespaces = namespaces.len(), "orchestrator available");
                mark_available(caps.with_orchestrator(namespaces), SystemKind::OrchestratorApi, name)
            }
            Err(e) => mark_unreachable(caps, SystemKind::OrchestratorApi, name, e.to_string()),
        },
        other => not_ready(caps, SystemKind::OrchestratorApi, other),
    };

    caps = match &backends.local_cluster {
        Connection::Ready { name, backend } => match backend.status().await {
            Ok(Some(state)) => {
                tracing::debug!(%state, "local cluster present");
                mark_available(
                    caps.with_local_cluster(state),
                    SystemKind::LocalClusterManager,
                    name,
                )
            }
            Ok(None) => {
                tracing::debug!("no local cluster configured");
                caps.with_system(BackingSystem::absent(SystemKind::LocalClusterManager, name))
            }
            Err(e) => mark_unreachable(caps, SystemKind::LocalClusterManager, name, e.to_string()),
        },
        other => not_ready(caps, SystemKind::LocalClusterManager, other),
    };

    for system in caps.systems() {
        if let Availability::Unreachable(reason) = &system.availability {
            diagnostics.warn(Warning::system_skipped(format!(
                "{} ({}) is installed but unreachable: {reason}",
                system.kind, system.name
            )));
        }
    }

    caps
}

fn mark_available(caps: Capabilities, kind: SystemKind, name: &str) -> Capabilities {
    let system = BackingSystem::available_as(kind, name);
    caps.with_system(system)
}

fn mark_unreachable(
    caps: Capabilities,
    kind: SystemKind,
    name: &str,
    reason: String,
) -> Capabilities {
    tracing::debug!(%kind, name, %reason, "system unreachable");
    caps.with_system(BackingSystem::unreachable(kind, name, reason))
}

fn not_ready<T: ?Sized>(
    caps: Capabilities,
    kind: SystemKind,
    conn: &Connection<T>,
) -> Capabilities {
    match conn {
        Connection::Failed { name, reason } => mark_unreachable(caps, kind, name, reason.clone()),
        _ => caps.with_system(BackingSystem::absent(kind, conn.name())),
    }
}
