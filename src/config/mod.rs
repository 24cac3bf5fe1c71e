// ABOUTME: Configuration types and parsing for reclaim.yml.
// ABOUTME: Handles YAML parsing, file discovery and validation of timeouts.

use crate::cluster::LocalClusterConfig;
use crate::engine::EngineConfig;
use crate::error::{Error, Result};
use crate::orchestrator::OrchestratorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "reclaim.yml";
pub const CONFIG_FILENAME_ALT: &str = "reclaim.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".reclaim/config.yml";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "RECLAIM_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub local_cluster: LocalClusterConfig,

    /// Bound on every status query made while probing.
    #[serde(default = "default_status_timeout", with = "humantime_serde")]
    pub status_timeout: Duration,
}

fn default_status_timeout() -> Duration {
    Duration::from_secs(15)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            local_cluster: LocalClusterConfig::default(),
            status_timeout: default_status_timeout(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_yaml(&content)
    }

    /// Find a config file in `dir`, if any.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path wins, then `$RECLAIM_CONFIG`, then discovery in `dir`.
    /// A named file that does not exist is an error; finding nothing is not.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Self::load(&PathBuf::from(path));
        }

        Ok(Self::discover(dir)?.unwrap_or_else(|| {
            tracing::debug!("no configuration file found, using defaults");
            Config::default()
        }))
    }

    fn validate(&self) -> Result<()> {
        let timeouts = [
            ("engine.timeout", self.engine.timeout),
            ("engine.stop_timeout", self.engine.stop_timeout),
            ("orchestrator.delete_timeout", self.orchestrator.delete_timeout),
            ("local_cluster.operation_timeout", self.local_cluster.operation_timeout),
            ("status_timeout", self.status_timeout),
        ];
        for (key, value) in timeouts {
            if value.is_zero() && key != "engine.stop_timeout" {
                return Err(Error::InvalidConfig(format!("{key} must be greater than zero")));
            }
        }

        if self.orchestrator.binary.trim().is_empty() {
            return Err(Error::InvalidConfig("orchestrator.binary cannot be empty".into()));
        }
        if self.local_cluster.binary.trim().is_empty() {
            return Err(Error::InvalidConfig("local_cluster.binary cannot be empty".into()));
        }
        Ok(())
    }
}
