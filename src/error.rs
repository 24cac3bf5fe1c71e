// ABOUTME: Application-wide error types for reclaim.
// ABOUTME: Every variant here is fatal and maps to exit code 1.

use crate::sweep::InvalidLevel;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidLevel(#[from] InvalidLevel),

    #[error("no backing system detected (no container engine, orchestrator or local cluster available)")]
    NoBackingSystems,

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
