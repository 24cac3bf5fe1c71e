// ABOUTME: Protected namespace policy for whole-namespace deletion.
// ABOUTME: The four system namespaces are always protected; config can add more.

use crate::types::NamespaceName;
use std::collections::BTreeSet;

/// Namespaces that are never deleted as a whole.
pub const PROTECTED_NAMESPACES: [&str; 4] =
    ["kube-system", "kube-public", "kube-node-lease", "default"];

/// The set of namespaces a sweep must never delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedNamespaces {
    names: BTreeSet<String>,
}

impl Default for ProtectedNamespaces {
    fn default() -> Self {
        Self::with_extra(&[])
    }
}

impl ProtectedNamespaces {
    /// Built-in protections plus `extra`. Extras can only add, never remove.
    pub fn with_extra(extra: &[NamespaceName]) -> Self {
        let names = PROTECTED_NAMESPACES
            .iter()
            .map(|s| s.to_string())
            .chain(extra.iter().map(|n| n.as_str().to_string()))
            .collect();
        Self { names }
    }

    pub fn contains(&self, namespace: &NamespaceName) -> bool {
        self.names.contains(namespace.as_str())
    }

    /// Namespaces from `live` that may be deleted, deduplicated and sorted.
    pub fn deletable(&self, live: &[NamespaceName]) -> Vec<NamespaceName> {
        live.iter()
            .filter(|ns| !self.contains(ns))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
