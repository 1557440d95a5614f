//! Service-level errors for dependency graph operations.

use crate::dependency::{
    domain::{CyclePath, DependencyDomainError, Principal, ProjectId, TaskId},
    ports::{DependencyRepositoryError, TaskRepositoryError},
};
use thiserror::Error;

/// Underlying store failure carried by
/// [`DependencyGraphError::RepositoryUnavailable`].
#[derive(Debug, Error)]
pub enum RepositoryFailure {
    /// The task store failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
    /// The dependency edge store failed.
    #[error(transparent)]
    Dependencies(#[from] DependencyRepositoryError),
}

/// Errors returned by the dependency graph service.
///
/// Every validation failure is deterministic for the current graph state and
/// is never retried by the service.
#[derive(Debug, Error)]
pub enum DependencyGraphError {
    /// The principal may not manage dependencies in the project.
    #[error("{principal} may not manage dependencies in project {project_id}")]
    Forbidden {
        /// Acting principal.
        principal: Principal,
        /// Project the mutation targeted.
        project_id: ProjectId,
    },

    /// A task cannot depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// The endpoints belong to different projects.
    #[error(
        "task {source_task_id} (project {source_project_id}) cannot depend on task {target_task_id} (project {target_project_id})"
    )]
    CrossProjectDependency {
        /// Dependent task.
        source_task_id: TaskId,
        /// Project of the dependent task.
        source_project_id: ProjectId,
        /// Prerequisite task.
        target_task_id: TaskId,
        /// Project of the prerequisite task.
        target_project_id: ProjectId,
    },

    /// A referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The ordered pair already has an edge.
    #[error("task {source_task_id} already depends on task {target_task_id}")]
    DuplicateDependency {
        /// Dependent task.
        source_task_id: TaskId,
        /// Prerequisite task.
        target_task_id: TaskId,
    },

    /// The edge would close a cycle.
    #[error("dependency would create a cycle: {path}")]
    CyclicDependency {
        /// Closed walk starting and ending at the dependent task.
        path: CyclePath,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DependencyDomainError),

    /// A store could not serve the request; the caller may retry.
    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(#[source] RepositoryFailure),
}

impl DependencyGraphError {
    /// Returns `true` for transient failures worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RepositoryUnavailable(_))
    }

    /// Returns the task identifiers named by the error, for diagnostics.
    #[must_use]
    pub fn offending_tasks(&self) -> Vec<TaskId> {
        match self {
            Self::SelfDependency(task_id) | Self::TaskNotFound(task_id) => vec![*task_id],
            Self::CrossProjectDependency {
                source_task_id,
                target_task_id,
                ..
            }
            | Self::DuplicateDependency {
                source_task_id,
                target_task_id,
            } => vec![*source_task_id, *target_task_id],
            Self::CyclicDependency { path } => path.members(),
            Self::Domain(DependencyDomainError::SelfDependency(task_id)) => vec![*task_id],
            Self::Forbidden { .. } | Self::Domain(_) | Self::RepositoryUnavailable(_) => {
                Vec::new()
            }
        }
    }
}

impl From<TaskRepositoryError> for DependencyGraphError {
    fn from(err: TaskRepositoryError) -> Self {
        Self::RepositoryUnavailable(RepositoryFailure::Tasks(err))
    }
}

impl From<DependencyRepositoryError> for DependencyGraphError {
    fn from(err: DependencyRepositoryError) -> Self {
        match err {
            DependencyRepositoryError::DuplicateEdge {
                source_task_id,
                target_task_id,
            } => Self::DuplicateDependency {
                source_task_id,
                target_task_id,
            },
            DependencyRepositoryError::CycleDetected {
                source_task_id,
                target_task_id,
            } => Self::CyclicDependency {
                path: CyclePath::unresolved(source_task_id, target_task_id),
            },
            DependencyRepositoryError::Persistence(_) => {
                Self::RepositoryUnavailable(RepositoryFailure::Dependencies(err))
            }
        }
    }
}

/// Result type for dependency graph service operations.
pub type DependencyGraphResult<T> = Result<T, DependencyGraphError>;
