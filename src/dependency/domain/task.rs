//! Read-only task snapshots as seen by the dependency engine.

use super::{ParseTaskStatusError, ProjectId, TaskId};
use serde::{Deserialize, Serialize};

/// Task progress status relevant to dependency evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    Pending,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` once work on the task has begun.
    #[must_use]
    pub const fn has_started(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns `true` when the task is completed.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Snapshot of a task record owned by the external task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    status: TaskStatus,
    title: String,
}

impl Task {
    /// Creates a pending task snapshot with a fresh identifier.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self::from_parts(TaskId::new(), project_id, TaskStatus::Pending, title)
    }

    /// Reconstructs a task snapshot from stored fields.
    #[must_use]
    pub fn from_parts(
        id: TaskId,
        project_id: ProjectId,
        status: TaskStatus,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_id,
            status,
            title: title.into(),
        }
    }

    /// Returns a copy of this task with a different status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}
