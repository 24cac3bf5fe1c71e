// ABOUTME: Engine socket detection on the local host.
// ABOUTME: Honours explicit config and DOCKER_HOST, then checks Docker and Podman sockets.

use super::types::{EngineConfig, EngineKind, SocketInfo};
use std::path::Path;

/// Error during engine socket detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container engine socket found (checked Docker and Podman sockets)")]
    NoSocketFound,

    #[error("configured engine socket does not exist: {0}")]
    ConfiguredSocketMissing(String),

    #[error("unsupported DOCKER_HOST (only unix:// sockets are supported): {0}")]
    UnsupportedHost(String),
}

const DOCKER_SOCKET: &str = "/var/run/docker.sock";
const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";

/// Detect the container engine socket on the local system.
///
/// Detection order:
/// 1. `engine.socket` from config (must exist, no fallback)
/// 2. `DOCKER_HOST` when it is a `unix://` URL
/// 3. Rootful Docker socket (`/var/run/docker.sock`)
/// 4. Rootless Docker socket (`$XDG_RUNTIME_DIR/docker.sock`)
/// 5. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 6. Rootful Podman socket (`/run/podman/podman.sock`)
///
/// If only `engine.runtime` is configured, that engine's default socket is used.
pub fn detect_local(config: &EngineConfig) -> Result<SocketInfo, DetectionError> {
    if let Some(ref socket) = config.socket {
        if !Path::new(socket).exists() {
            return Err(DetectionError::ConfiguredSocketMissing(socket.clone()));
        }
        return Ok(SocketInfo {
            kind: config
                .runtime
                .unwrap_or_else(|| EngineKind::from_socket_path(socket)),
            path: socket.clone(),
        });
    }

    if let Some(kind) = config.runtime {
        let path = default_socket_path(kind);
        if !Path::new(&path).exists() {
            return Err(DetectionError::ConfiguredSocketMissing(path));
        }
        return Ok(SocketInfo { kind, path });
    }

    if let Ok(host) = std::env::var("DOCKER_HOST")
        && !host.is_empty()
    {
        let path = host
            .strip_prefix("unix://")
            .ok_or_else(|| DetectionError::UnsupportedHost(host.clone()))?;
        if Path::new(path).exists() {
            return Ok(SocketInfo {
                kind: EngineKind::from_socket_path(path),
                path: path.to_string(),
            });
        }
        tracing::debug!(path, "DOCKER_HOST socket missing, continuing detection");
    }

    candidate_sockets()
        .into_iter()
        .find(|(_, path)| Path::new(path).exists())
        .map(|(kind, path)| SocketInfo { kind, path })
        .ok_or(DetectionError::NoSocketFound)
}

fn candidate_sockets() -> Vec<(EngineKind, String)> {
    let mut candidates = vec![(EngineKind::Docker, DOCKER_SOCKET.to_string())];

    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        candidates.push((EngineKind::Docker, format!("{runtime_dir}/docker.sock")));
    }

    if let Some(uid) = get_uid() {
        candidates.push((
            EngineKind::Podman,
            format!("/run/user/{uid}/podman/podman.sock"),
        ));
    }

    candidates.push((EngineKind::Podman, ROOTFUL_PODMAN.to_string()));
    candidates
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

fn default_socket_path(kind: EngineKind) -> String {
    match kind {
        EngineKind::Docker => DOCKER_SOCKET.to_string(),
        EngineKind::Podman => ROOTFUL_PODMAN.to_string(),
    }
}
