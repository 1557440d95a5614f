//! In-memory dependency edge repository.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::dependency::{
    domain::{DependencyEdge, EdgeId, ProjectId, TaskId},
    ports::{DependencyRepository, DependencyRepositoryError, DependencyRepositoryResult},
};

/// Thread-safe in-memory edge store.
///
/// Edges are kept in insertion order, which doubles as creation order for
/// every listing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDependencyRepository {
    edges: Arc<RwLock<Vec<DependencyEdge>>>,
}

fn lock_error(err: &impl std::fmt::Display) -> DependencyRepositoryError {
    DependencyRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryDependencyRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored edges across all projects.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn len(&self) -> DependencyRepositoryResult<usize> {
        let edges = self.edges.read().map_err(|err| lock_error(&err))?;
        Ok(edges.len())
    }

    /// Returns `true` when no edges are stored.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn is_empty(&self) -> DependencyRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn filtered(
        &self,
        predicate: impl Fn(&DependencyEdge) -> bool,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        let edges = self.edges.read().map_err(|err| lock_error(&err))?;
        Ok(edges.iter().filter(|edge| predicate(edge)).cloned().collect())
    }
}

#[async_trait]
impl DependencyRepository for InMemoryDependencyRepository {
    async fn insert_edge(&self, edge: &DependencyEdge) -> DependencyRepositoryResult<EdgeId> {
        let mut edges = self.edges.write().map_err(|err| lock_error(&err))?;
        let source_task_id = edge.source_task_id();
        let target_task_id = edge.target_task_id();
        if edges
            .iter()
            .any(|existing| existing.connects(source_task_id, target_task_id))
        {
            return Err(DependencyRepositoryError::DuplicateEdge {
                source_task_id,
                target_task_id,
            });
        }
        edges.push(edge.clone());
        Ok(edge.id())
    }

    async fn delete_edge(
        &self,
        source_task_id: TaskId,
        target_task_id: TaskId,
    ) -> DependencyRepositoryResult<bool> {
        let mut edges = self.edges.write().map_err(|err| lock_error(&err))?;
        let before = edges.len();
        edges.retain(|edge| !edge.connects(source_task_id, target_task_id));
        Ok(edges.len() != before)
    }

    async fn delete_edges_for_task(&self, task_id: TaskId) -> DependencyRepositoryResult<usize> {
        let mut edges = self.edges.write().map_err(|err| lock_error(&err))?;
        let before = edges.len();
        edges.retain(|edge| !edge.touches(task_id));
        Ok(before.saturating_sub(edges.len()))
    }

    async fn list_by_source(
        &self,
        task_id: TaskId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        self.filtered(|edge| edge.source_task_id() == task_id)
    }

    async fn list_by_target(
        &self,
        task_id: TaskId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        self.filtered(|edge| edge.target_task_id() == task_id)
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        self.filtered(|edge| edge.project_id() == project_id)
    }
}
