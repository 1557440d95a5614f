//! Shared test helpers for `PostgreSQL` integration tests.

use std::future::Future;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{Text, Uuid as SqlUuid};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::fixture;
use tokio::runtime::Runtime;
use trellis::dependency::{
    adapters::postgres::DependencyPgPool,
    domain::{ProjectId, TaskId, TaskStatus},
};
use uuid::Uuid;

/// SQL creating the task and dependency tables.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_task_dependencies/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "trellis_test_template";

/// Creates a runtime for driving the async adapters from synchronous tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, eyre::Report> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?)
}

/// Runs a test body to completion on a fresh runtime.
///
/// # Errors
///
/// Returns whatever the body returns, or an error if no runtime can be built.
pub fn block_on<F>(body: F) -> Result<(), eyre::Report>
where
    F: Future<Output = Result<(), eyre::Report>>,
{
    test_runtime()?.block_on(body)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), eyre::Report> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("template setup failed: {e}"))
}

/// Drops a test database when the owning [`TestDatabase`] goes away.
struct DatabaseGuard {
    cluster: &'static TestCluster,
    name: String,
}

impl Drop for DatabaseGuard {
    fn drop(&mut self) {
        // Cleanup is best effort; the cluster is discarded with the test run.
        drop(self.cluster.drop_database(self.name.as_str()));
    }
}

/// A database cloned from the migrated template, dropped with the value.
pub struct TestDatabase {
    pub pool: DependencyPgPool,
    // Declared after `pool` so connections close before the database drops.
    _guard: DatabaseGuard,
}

impl TestDatabase {
    /// Creates a fresh database from the template and opens a pool on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster cannot create the database or the
    /// pool cannot connect.
    pub fn create(cluster: &'static TestCluster) -> Result<Self, eyre::Report> {
        ensure_template(cluster)?;
        let name = format!("trellis_test_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("failed to create {name}: {e}"))?;
        let guard = DatabaseGuard { cluster, name };

        let url = cluster.connection().database_url(&guard.name);
        let pool = Pool::builder()
            .max_size(4)
            .build(ConnectionManager::<PgConnection>::new(url))?;

        Ok(Self {
            pool,
            _guard: guard,
        })
    }

    /// Inserts a task row directly, standing in for the external task store.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_task(
        &self,
        project_id: ProjectId,
        title: &str,
        status: TaskStatus,
    ) -> Result<TaskId, eyre::Report> {
        let id = TaskId::new();
        let mut conn = self.pool.get()?;
        diesel::sql_query(
            "INSERT INTO tasks (id, project_id, title, status) VALUES ($1, $2, $3, $4)",
        )
        .bind::<SqlUuid, _>(id.into_inner())
        .bind::<SqlUuid, _>(project_id.into_inner())
        .bind::<Text, _>(title)
        .bind::<Text, _>(status.as_str())
        .execute(&mut *conn)?;
        Ok(id)
    }

    /// Overwrites a task row's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_status(&self, task_id: TaskId, status: &str) -> Result<(), eyre::Report> {
        let mut conn = self.pool.get()?;
        diesel::sql_query("UPDATE tasks SET status = $1 WHERE id = $2")
            .bind::<Text, _>(status)
            .bind::<SqlUuid, _>(task_id.into_inner())
            .execute(&mut *conn)?;
        Ok(())
    }
}

/// Provides a migrated database on the shared embedded cluster.
///
/// A cluster that cannot start fails the test rather than skipping it.
#[fixture]
pub fn database(
    shared_test_cluster: &'static TestCluster,
) -> Result<TestDatabase, eyre::Report> {
    TestDatabase::create(shared_test_cluster)
}
