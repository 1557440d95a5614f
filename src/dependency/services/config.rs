//! Configuration for the dependency graph service.

use serde::Deserialize;

/// How `add_dependency` treats an ordered pair that already has an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateDependency`.
    #[default]
    Reject,
    /// Succeed without writing and return the stored edge unchanged, even
    /// when the requested dependency type differs.
    ReturnExisting,
}

/// Tunable behaviour of the dependency graph service.
///
/// Deserialises with every field optional so embedders can load it from
/// their own configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DependencyGraphConfig {
    /// Duplicate edge handling.
    pub duplicate_policy: DuplicatePolicy,
}

impl DependencyGraphConfig {
    /// Creates a lenient configuration that treats duplicates as no-ops.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::ReturnExisting,
        }
    }

    /// Returns a copy with the given duplicate policy.
    #[must_use]
    pub const fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }
}
