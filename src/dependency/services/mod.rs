//! Application services for dependency graph orchestration.

mod config;
mod error;
mod graph;
mod locks;

pub use config::{DependencyGraphConfig, DuplicatePolicy};
pub use error::{DependencyGraphError, DependencyGraphResult, RepositoryFailure};
pub use graph::{
    AddDependencyRequest, DependencyGraphService, LinkedTask, ProjectGraph, RemovalOutcome,
};
pub use locks::{ProjectLockGuard, ProjectLocks};
