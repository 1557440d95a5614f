//! In-memory task store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::dependency::{
    domain::{ProjectId, Task, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task store.
///
/// Stands in for the external task store. Besides the read-only port it
/// offers seeding and status updates so tests can drive prerequisite
/// progress.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    insertion_order: Vec<TaskId>,
}

fn lock_error(err: &impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn upsert(&self, task: Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        if !state.tasks.contains_key(&task.id()) {
            state.insertion_order.push(task.id());
        }
        state.tasks.insert(task.id(), task);
        Ok(())
    }

    /// Changes the status of a stored task.
    ///
    /// Returns the updated task, or `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn set_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let Some(task) = state.tasks.remove(&id) else {
            return Ok(None);
        };
        let updated = task.with_status(status);
        state.tasks.insert(id, updated.clone());
        Ok(Some(updated))
    }

    /// Removes a task, returning it when present.
    ///
    /// Edge cleanup is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn remove(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.insertion_order.retain(|task_id| *task_id != id);
        Ok(state.tasks.remove(&id))
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let tasks = state
            .insertion_order
            .iter()
            .filter_map(|task_id| state.tasks.get(task_id))
            .filter(|task| task.project_id() == project_id)
            .cloned()
            .collect();
        Ok(tasks)
    }
}
