//! Error types for dependency domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing dependency domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyDomainError {
    /// A task cannot depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// The principal identifier is empty after trimming.
    #[error("principal must not be empty")]
    EmptyPrincipal,
}

/// Error returned while parsing dependency types at the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "unknown dependency type: {0} (expected finish-to-start, start-to-start, finish-to-finish or start-to-finish)"
)]
pub struct ParseDependencyTypeError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
