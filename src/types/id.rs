// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Keeps container IDs and pod names from being passed for one another.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub enum ContainerMarker {}
pub enum PodMarker {}

/// A type-safe identifier that prevents accidental mixing of different ID types.
///
/// A container ID handed to a pod deletion (or the reverse) is a compile error
/// rather than a `kubectl` call against the wrong object.
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// First twelve characters, the way engine CLIs abbreviate IDs.
    pub fn short(&self) -> &str {
        match self.value.char_indices().nth(12) {
            Some((idx, _)) => &self.value[..idx],
            None => &self.value,
        }
    }
}

// Markers carry no traits, so nothing below can be derived.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type ContainerId = Id<ContainerMarker>;
pub type PodName = Id<PodMarker>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_compare_by_value() {
        let a = ContainerId::new("abc".to_string());
        let b = ContainerId::new("abc".to_string());
        assert_eq!(a, b);

        let set: HashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(a.to_string(), "abc");
    }

    #[test]
    fn short_truncates_long_ids_only() {
        let long = ContainerId::new("0123456789abcdef0123".to_string());
        assert_eq!(long.short(), "0123456789ab");

        let brief = ContainerId::new("abc".to_string());
        assert_eq!(brief.short(), "abc");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = PodName::new("web-7d4".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"web-7d4\"");
        let back: PodName = serde_json::from_str("\"web-7d4\"").unwrap();
        assert_eq!(back.into_inner(), "web-7d4");
    }
}
