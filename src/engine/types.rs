// ABOUTME: Container engine type definitions for Docker and Podman.
// ABOUTME: Includes EngineKind, the detected socket, and engine-facing config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The container engine behind the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Docker,
    Podman,
}

impl EngineKind {
    /// Guess the engine from a socket path.
    pub fn from_socket_path(path: &str) -> Self {
        if path.contains("podman") {
            EngineKind::Podman
        } else {
            EngineKind::Docker
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Docker => write!(f, "docker"),
            EngineKind::Podman => write!(f, "podman"),
        }
    }
}

/// A detected engine socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketInfo {
    /// The engine expected behind the socket.
    pub kind: EngineKind,
    /// Filesystem path of the Unix socket.
    pub path: String,
}

/// Engine section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Explicit engine type (overrides detection).
    #[serde(default)]
    pub runtime: Option<EngineKind>,

    /// Explicit socket path (overrides detection).
    #[serde(default)]
    pub socket: Option<String>,

    /// Client timeout for every engine API call.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Grace period handed to `stop` before the engine kills a container.
    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            runtime: None,
            socket: None,
            timeout: default_timeout(),
            stop_timeout: default_stop_timeout(),
        }
    }
}
