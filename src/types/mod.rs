// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod namespace;

pub use id::{ContainerId, PodName};
pub use namespace::{NamespaceName, NamespaceNameError};
