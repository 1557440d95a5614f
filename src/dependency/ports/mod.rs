//! Port contracts for dependency graph management.
//!
//! Ports define infrastructure-agnostic interfaces used by the dependency
//! graph service: task lookup, edge persistence, and permission decisions.

pub mod permission;
pub mod repository;
pub mod task;

pub use permission::PermissionGate;
pub use repository::{DependencyRepository, DependencyRepositoryError, DependencyRepositoryResult};
pub use task::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};

#[cfg(test)]
pub use permission::MockPermissionGate;
#[cfg(test)]
pub use repository::MockDependencyRepository;
#[cfg(test)]
pub use task::MockTaskRepository;
