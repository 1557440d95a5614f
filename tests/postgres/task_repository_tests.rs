//! Task lookups against a live `PostgreSQL` server.

use super::helpers::{TestDatabase, block_on, database};
use diesel::connection::SimpleConnection;
use rstest::rstest;
use trellis::dependency::{
    adapters::postgres::PostgresTaskRepository,
    domain::{ProjectId, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};

#[rstest]
fn finds_tasks_by_id_and_project(
    database: Result<TestDatabase, eyre::Report>,
) -> Result<(), eyre::Report> {
    let db = database?;
    block_on(async {
        let repo = PostgresTaskRepository::new(db.pool.clone());
        let project_id = ProjectId::new();
        let roof = db.insert_task(project_id, "Roof", TaskStatus::InProgress)?;
        db.insert_task(project_id, "Gutters", TaskStatus::Pending)?;
        db.insert_task(ProjectId::new(), "Elsewhere", TaskStatus::Completed)?;

        let found = repo
            .find_by_id(roof)
            .await?
            .ok_or_else(|| eyre::eyre!("roof task should exist"))?;
        eyre::ensure!(found.title() == "Roof", "title mismatch");
        eyre::ensure!(found.project_id() == project_id, "project mismatch");
        eyre::ensure!(found.status() == TaskStatus::InProgress, "status mismatch");
        eyre::ensure!(
            repo.find_by_id(TaskId::new()).await?.is_none(),
            "unknown task should be absent"
        );
        eyre::ensure!(
            repo.list_by_project(project_id).await?.len() == 2,
            "listing should stay within the project"
        );
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn unknown_status_is_a_persistence_error(
    database: Result<TestDatabase, eyre::Report>,
) -> Result<(), eyre::Report> {
    let db = database?;
    block_on(async {
        let repo = PostgresTaskRepository::new(db.pool.clone());
        let task_id = db.insert_task(ProjectId::new(), "Odd", TaskStatus::Pending)?;
        db.set_status(task_id, "completed")?;
        let status = repo.find_by_id(task_id).await?.map(|task| task.status());
        eyre::ensure!(
            status == Some(TaskStatus::Completed),
            "status update should be visible"
        );

        // The CHECK constraint keeps bad values out, so drop it to simulate drift.
        db.pool
            .get()?
            .batch_execute("ALTER TABLE tasks DROP CONSTRAINT IF EXISTS tasks_status_check")?;
        db.set_status(task_id, "archived")?;

        let result = repo.find_by_id(task_id).await;
        eyre::ensure!(
            matches!(result, Err(TaskRepositoryError::Persistence(_))),
            "expected a persistence error, got {result:?}"
        );
        Ok::<(), eyre::Report>(())
    })
}
