// ABOUTME: DNS-compatible Kubernetes namespace name validation.
// ABOUTME: Ensures namespace names follow RFC 1123 label requirements.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NamespaceNameError {
    #[error("namespace name cannot be empty")]
    Empty,

    #[error("namespace name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("namespace name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("namespace name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("namespace name must be lowercase")]
    NotLowercase,

    #[error("invalid character in namespace name: '{0}'")]
    InvalidChar(char),
}

/// A validated namespace name.
///
/// Names returned by the orchestrator are always valid labels; validating them
/// anyway keeps a malformed listing from ever reaching a `kubectl delete`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceName(String);

impl NamespaceName {
    pub fn new(value: &str) -> Result<Self, NamespaceNameError> {
        if value.is_empty() {
            return Err(NamespaceNameError::Empty);
        }

        if value.len() > 63 {
            return Err(NamespaceNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(NamespaceNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(NamespaceNameError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(NamespaceNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(NamespaceNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// The `default` namespace.
    pub fn default_namespace() -> Self {
        Self("default".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NamespaceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NamespaceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(&value).map_err(serde::de::Error::custom)
    }
}
