//! Diesel row models for dependency graph persistence.

use super::schema::{task_dependencies, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display title.
    pub title: String,
    /// Task status in storage form.
    pub status: String,
}

/// Query result row for dependency edges.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DependencyRow {
    /// Edge identifier.
    pub id: uuid::Uuid,
    /// Project both endpoints belong to.
    pub project_id: uuid::Uuid,
    /// Dependent task.
    pub task_id: uuid::Uuid,
    /// Prerequisite task.
    pub dependency_task_id: uuid::Uuid,
    /// Precedence kind in storage form.
    pub dependency_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for dependency edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_dependencies)]
pub struct NewDependencyRow {
    /// Edge identifier.
    pub id: uuid::Uuid,
    /// Project both endpoints belong to.
    pub project_id: uuid::Uuid,
    /// Dependent task.
    pub task_id: uuid::Uuid,
    /// Prerequisite task.
    pub dependency_task_id: uuid::Uuid,
    /// Precedence kind in storage form.
    pub dependency_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Result of the reachability probe run before inserting an edge.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct ReachabilityRow {
    /// Whether the dependent task is reachable from the prerequisite.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub reachable: bool,
}
