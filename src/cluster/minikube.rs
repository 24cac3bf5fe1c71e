// ABOUTME: Local-cluster operations trait and its minikube implementation.
// ABOUTME: Status, in-node commands, image cache, cluster deletion and on-disk cleanup.

use super::error::{ClusterError, Result};
use super::status::{ClusterState, parse_status};
use crate::command::CommandRunner;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Local cluster section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalClusterConfig {
    /// minikube binary name or path.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Profile to operate on instead of the active one.
    #[serde(default)]
    pub profile: Option<String>,

    /// minikube home directory (the one holding `cache/` and `logs/`).
    #[serde(default)]
    pub home: Option<PathBuf>,

    /// Upper bound for in-node commands, cache operations and cluster deletion.
    #[serde(default = "default_operation_timeout", with = "humantime_serde")]
    pub operation_timeout: Duration,
}

fn default_binary() -> String {
    "minikube".to_string()
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(300)
}

impl Default for LocalClusterConfig {
    fn default() -> Self {
        LocalClusterConfig {
            binary: default_binary(),
            profile: None,
            home: None,
            operation_timeout: default_operation_timeout(),
        }
    }
}

/// Directories under the minikube home removed when the cluster is stopped.
pub const LOCAL_DIRS: [&str; 2] = ["cache", "logs"];

/// Local-cluster operations used by the prober and executor.
#[async_trait]
pub trait LocalClusterOps: Send + Sync {
    /// Host state, `None` when no local cluster exists.
    async fn status(&self) -> Result<Option<ClusterState>>;

    /// Run a command inside the cluster node, returning its stdout.
    async fn exec_in_node(&self, command: &[&str]) -> Result<String>;

    /// Images held in the manager's local image cache.
    async fn list_cached_images(&self) -> Result<Vec<String>>;

    /// Remove images from the manager's local image cache.
    async fn delete_cached_images(&self, images: &[String]) -> Result<()>;

    /// Delete the entire local cluster.
    async fn delete_cluster(&self) -> Result<()>;

    /// Remove the on-disk cache and log directories, returning those that existed.
    async fn remove_local_dirs(&self) -> Result<Vec<PathBuf>>;
}

/// minikube-backed local cluster client.
pub struct Minikube {
    runner: Arc<dyn CommandRunner>,
    config: LocalClusterConfig,
    status_timeout: Duration,
}

impl Minikube {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        config: LocalClusterConfig,
        status_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            config,
            status_timeout,
        }
    }

    /// Resolve the minikube binary on PATH.
    pub fn locate(&self) -> Option<PathBuf> {
        self.runner.locate(&self.config.binary)
    }

    /// The minikube home directory.
    ///
    /// Config wins, then `MINIKUBE_HOME` (with `.minikube` appended unless it
    /// already ends there, as minikube itself does), then `~/.minikube`.
    pub fn home(&self) -> Result<PathBuf> {
        if let Some(ref home) = self.config.home {
            return expand_home(home);
        }

        if let Ok(env_home) = std::env::var("MINIKUBE_HOME")
            && !env_home.is_empty()
        {
            let path = PathBuf::from(env_home);
            if path.file_name().is_some_and(|n| n == ".minikube") {
                return Ok(path);
            }
            return Ok(path.join(".minikube"));
        }

        dirs::home_dir()
            .map(|h| h.join(".minikube"))
            .ok_or(ClusterError::NoHome)
    }

    fn args(&self, rest: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(rest.len() + 2);
        if let Some(ref profile) = self.config.profile {
            args.push("-p".to_string());
            args.push(profile.clone());
        }
        args.extend(rest.iter().map(|s| s.to_string()));
        args
    }

    async fn run_checked(&self, rest: &[&str]) -> Result<String> {
        let output = self
            .runner
            .run(
                &self.config.binary,
                &self.args(rest),
                self.config.operation_timeout,
            )
            .await?
            .into_success(&self.config.binary)?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl LocalClusterOps for Minikube {
    async fn status(&self) -> Result<Option<ClusterState>> {
        // Non-zero exit is normal here: minikube encodes a stopped host in the code
        let output = self
            .runner
            .run(
                &self.config.binary,
                &self.args(&["status", "-o", "json"]),
                self.status_timeout,
            )
            .await?;
        Ok(parse_status(&output.stdout))
    }

    async fn exec_in_node(&self, command: &[&str]) -> Result<String> {
        let mut rest = vec!["ssh", "--"];
        rest.extend_from_slice(command);
        self.run_checked(&rest).await
    }

    async fn list_cached_images(&self) -> Result<Vec<String>> {
        let stdout = self.run_checked(&["cache", "list"]).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn delete_cached_images(&self, images: &[String]) -> Result<()> {
        if images.is_empty() {
            return Ok(());
        }
        let mut rest = vec!["cache", "delete"];
        rest.extend(images.iter().map(String::as_str));
        self.run_checked(&rest).await?;
        Ok(())
    }

    async fn delete_cluster(&self) -> Result<()> {
        self.run_checked(&["delete"]).await?;
        Ok(())
    }

    async fn remove_local_dirs(&self) -> Result<Vec<PathBuf>> {
        let home = self.home()?;
        remove_dirs(&home, &LOCAL_DIRS).await
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|h| h.join(rest))
            .ok_or(ClusterError::NoHome),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Remove `names` under `root`, skipping those that do not exist.
pub async fn remove_dirs(root: &Path, names: &[&str]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for name in names {
        let path = root.join(name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        tokio::fs::remove_dir_all(&path)
            .await
            .map_err(|source| ClusterError::RemoveDir {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "removed directory");
        removed.push(path);
    }
    Ok(removed)
}

/// Parse the `Total reclaimed space: 1.5GB` line docker prints after a prune.
pub fn parse_reclaimed_space(output: &str) -> Option<u64> {
    let value = output
        .lines()
        .find_map(|l| l.trim().strip_prefix("Total reclaimed space:"))?
        .trim();

    let split = value
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;

    // docker reports decimal units
    let multiplier = match unit.trim() {
        "B" | "" => 1.0,
        "kB" | "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        _ => return None,
    };
    Some((number * multiplier).round() as u64)
}
