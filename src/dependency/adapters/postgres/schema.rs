//! Diesel schema for dependency graph persistence.

diesel::table! {
    /// Task records read by the dependency engine.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display title.
        #[max_length = 255]
        title -> Varchar,
        /// Task status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp, used for stable listing order.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dependency edges; `task_id` depends on `dependency_task_id`.
    task_dependencies (id) {
        /// Edge identifier.
        id -> Uuid,
        /// Project both endpoints belong to.
        project_id -> Uuid,
        /// Dependent task.
        task_id -> Uuid,
        /// Prerequisite task.
        dependency_task_id -> Uuid,
        /// Precedence kind.
        #[max_length = 32]
        dependency_type -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, task_dependencies);
