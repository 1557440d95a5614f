//! Derived blocking state for a task's start and completion.

use super::{ConstrainedTransition, DependencyType, Task, TaskId};
use serde::Serialize;

/// Prerequisite that currently holds a task back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingDependency {
    /// The unmet prerequisite task.
    pub task: Task,
    /// The dependency kind that makes it block.
    pub dependency_type: DependencyType,
}

/// Advisory view of whether a task may start or complete right now.
///
/// Never persisted; recompute it after any prerequisite status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingState {
    task_id: TaskId,
    blocks_start: Vec<BlockingDependency>,
    blocks_completion: Vec<BlockingDependency>,
}

impl BlockingState {
    /// Evaluates the direct dependencies of `task_id`.
    ///
    /// Each `(prerequisite, type)` pair contributes to the start set or the
    /// completion set according to [`DependencyType::constrains`] when the
    /// prerequisite's status does not yet satisfy the type. Input order is
    /// preserved within each set.
    #[must_use]
    pub fn evaluate<I>(task_id: TaskId, dependencies: I) -> Self
    where
        I: IntoIterator<Item = (Task, DependencyType)>,
    {
        let mut blocks_start = Vec::new();
        let mut blocks_completion = Vec::new();

        for (task, dependency_type) in dependencies {
            if dependency_type.is_satisfied_by(task.status()) {
                continue;
            }
            let blocker = BlockingDependency {
                task,
                dependency_type,
            };
            match dependency_type.constrains() {
                ConstrainedTransition::Start => blocks_start.push(blocker),
                ConstrainedTransition::Completion => blocks_completion.push(blocker),
            }
        }

        Self {
            task_id,
            blocks_start,
            blocks_completion,
        }
    }

    /// Returns the evaluated task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Prerequisites preventing the task from starting.
    #[must_use]
    pub fn blocks_start(&self) -> &[BlockingDependency] {
        &self.blocks_start
    }

    /// Prerequisites preventing the task from being marked completed.
    #[must_use]
    pub fn blocks_completion(&self) -> &[BlockingDependency] {
        &self.blocks_completion
    }

    /// Returns `true` when the task may start.
    #[must_use]
    pub const fn can_start(&self) -> bool {
        self.blocks_start.is_empty()
    }

    /// Returns `true` when the task may be marked completed.
    #[must_use]
    pub const fn can_complete(&self) -> bool {
        self.blocks_completion.is_empty()
    }

    /// Returns `true` when either transition is blocked.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        !self.can_start() || !self.can_complete()
    }

    /// Iterates over every blocking prerequisite, start blockers first.
    pub fn blockers(&self) -> impl Iterator<Item = &BlockingDependency> {
        self.blocks_start.iter().chain(&self.blocks_completion)
    }
}
