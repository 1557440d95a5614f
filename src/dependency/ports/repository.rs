//! Repository port for dependency edge persistence and lookup.

use crate::dependency::domain::{DependencyEdge, EdgeId, ProjectId, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for dependency repository operations.
pub type DependencyRepositoryResult<T> = Result<T, DependencyRepositoryError>;

/// Dependency edge persistence contract.
///
/// Listing operations return edges in creation order so callers observe a
/// stable ordering for the same stored state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependencyRepository: Send + Sync {
    /// Stores a new edge and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyRepositoryError::DuplicateEdge`] when an edge for
    /// the same ordered `(source, target)` pair already exists. Stores that
    /// can be written by several processes may also re-check reachability
    /// inside their own transaction and return
    /// [`DependencyRepositoryError::CycleDetected`].
    async fn insert_edge(&self, edge: &DependencyEdge) -> DependencyRepositoryResult<EdgeId>;

    /// Deletes the edge for the ordered pair.
    ///
    /// Returns `true` when an edge was removed and `false` when none existed.
    async fn delete_edge(
        &self,
        source_task_id: TaskId,
        target_task_id: TaskId,
    ) -> DependencyRepositoryResult<bool>;

    /// Deletes every edge in which the task is either endpoint.
    ///
    /// Returns the number of edges removed.
    async fn delete_edges_for_task(&self, task_id: TaskId) -> DependencyRepositoryResult<usize>;

    /// Returns the outgoing edges of a task (its dependencies).
    async fn list_by_source(&self, task_id: TaskId)
    -> DependencyRepositoryResult<Vec<DependencyEdge>>;

    /// Returns the incoming edges of a task (its dependents).
    async fn list_by_target(&self, task_id: TaskId)
    -> DependencyRepositoryResult<Vec<DependencyEdge>>;

    /// Returns every edge recorded for the project.
    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>>;
}

/// Errors returned by dependency repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DependencyRepositoryError {
    /// An edge for the ordered pair already exists.
    #[error("duplicate dependency edge: {source_task_id} -> {target_task_id}")]
    DuplicateEdge {
        /// Dependent task.
        source_task_id: TaskId,
        /// Prerequisite task.
        target_task_id: TaskId,
    },

    /// The store found that the edge would close a cycle with edges written
    /// since the caller last read the graph.
    #[error("dependency edge {source_task_id} -> {target_task_id} would close a cycle")]
    CycleDetected {
        /// Dependent task.
        source_task_id: TaskId,
        /// Prerequisite task.
        target_task_id: TaskId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DependencyRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
