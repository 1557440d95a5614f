//! Dependency edges and the four precedence kinds.

use super::{DependencyDomainError, EdgeId, ParseDependencyTypeError, ProjectId, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transition of the dependent task a dependency constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstrainedTransition {
    /// The dependent task may not start.
    Start,
    /// The dependent task may not be marked completed.
    Completion,
}

/// Precedence kind carried by a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    /// Dependent task cannot start until the prerequisite finishes.
    FinishToStart,
    /// Dependent task cannot start until the prerequisite starts.
    StartToStart,
    /// Dependent task cannot finish until the prerequisite finishes.
    FinishToFinish,
    /// Dependent task cannot finish until the prerequisite starts.
    StartToFinish,
}

impl DependencyType {
    /// All dependency types in canonical order.
    pub const ALL: [Self; 4] = [
        Self::FinishToStart,
        Self::StartToStart,
        Self::FinishToFinish,
        Self::StartToFinish,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinishToStart => "finish-to-start",
            Self::StartToStart => "start-to-start",
            Self::FinishToFinish => "finish-to-finish",
            Self::StartToFinish => "start-to-finish",
        }
    }

    /// Returns the transition of the dependent task this type constrains.
    #[must_use]
    pub const fn constrains(self) -> ConstrainedTransition {
        match self {
            Self::FinishToStart | Self::StartToStart => ConstrainedTransition::Start,
            Self::FinishToFinish | Self::StartToFinish => ConstrainedTransition::Completion,
        }
    }

    /// Returns `true` when a prerequisite in `status` no longer holds the
    /// dependent task back.
    #[must_use]
    pub const fn is_satisfied_by(self, status: TaskStatus) -> bool {
        match self {
            Self::FinishToStart | Self::FinishToFinish => status.is_completed(),
            Self::StartToStart | Self::StartToFinish => status.has_started(),
        }
    }
}

impl TryFrom<&str> for DependencyType {
    type Error = ParseDependencyTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "finish-to-start" | "fs" => Ok(Self::FinishToStart),
            "start-to-start" | "ss" => Ok(Self::StartToStart),
            "finish-to-finish" | "ff" => Ok(Self::FinishToFinish),
            "start-to-finish" | "sf" => Ok(Self::StartToFinish),
            _ => Err(ParseDependencyTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge stating that `source` depends on `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    id: EdgeId,
    project_id: ProjectId,
    source_task_id: TaskId,
    target_task_id: TaskId,
    dependency_type: DependencyType,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEdgeData {
    /// Persisted edge identifier.
    pub id: EdgeId,
    /// Project both endpoints belong to.
    pub project_id: ProjectId,
    /// Dependent task.
    pub source_task_id: TaskId,
    /// Prerequisite task.
    pub target_task_id: TaskId,
    /// Persisted precedence kind.
    pub dependency_type: DependencyType,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Creates a new edge from `source_task_id` to `target_task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyDomainError::SelfDependency`] when both endpoints
    /// are the same task.
    pub fn new(
        project_id: ProjectId,
        source_task_id: TaskId,
        target_task_id: TaskId,
        dependency_type: DependencyType,
        clock: &impl Clock,
    ) -> Result<Self, DependencyDomainError> {
        if source_task_id == target_task_id {
            return Err(DependencyDomainError::SelfDependency(source_task_id));
        }

        Ok(Self {
            id: EdgeId::new(),
            project_id,
            source_task_id,
            target_task_id,
            dependency_type,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an edge from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedEdgeData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            source_task_id: data.source_task_id,
            target_task_id: data.target_task_id,
            dependency_type: data.dependency_type,
            created_at: data.created_at,
        }
    }

    /// Returns the edge identifier.
    #[must_use]
    pub const fn id(&self) -> EdgeId {
        self.id
    }

    /// Returns the project scoping this edge.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the dependent task.
    #[must_use]
    pub const fn source_task_id(&self) -> TaskId {
        self.source_task_id
    }

    /// Returns the prerequisite task.
    #[must_use]
    pub const fn target_task_id(&self) -> TaskId {
        self.target_task_id
    }

    /// Returns the precedence kind.
    #[must_use]
    pub const fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when this edge connects the ordered pair.
    #[must_use]
    pub fn connects(&self, source_task_id: TaskId, target_task_id: TaskId) -> bool {
        self.source_task_id == source_task_id && self.target_task_id == target_task_id
    }

    /// Returns `true` when the task is either endpoint.
    #[must_use]
    pub fn touches(&self, task_id: TaskId) -> bool {
        self.source_task_id == task_id || self.target_task_id == task_id
    }
}
