//! `PostgreSQL` repository implementation for dependency edges.

use super::{
    models::{DependencyRow, NewDependencyRow, ReachabilityRow},
    schema::task_dependencies,
};
use crate::dependency::{
    domain::{DependencyEdge, DependencyType, EdgeId, PersistedEdgeData, ProjectId, TaskId},
    ports::{DependencyRepository, DependencyRepositoryError, DependencyRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Text, Uuid as SqlUuid};

/// `PostgreSQL` connection pool type used by dependency adapters.
pub type DependencyPgPool = Pool<ConnectionManager<PgConnection>>;

/// Walks existing edges from the prerequisite and reports whether the
/// dependent task is reachable. `UNION` drops revisited rows, so the walk
/// terminates even if the stored graph were cyclic.
const REACHABILITY_SQL: &str = concat!(
    "WITH RECURSIVE reachable(task_id) AS (",
    "SELECT $1::uuid ",
    "UNION ",
    "SELECT d.dependency_task_id FROM task_dependencies d ",
    "JOIN reachable r ON d.task_id = r.task_id",
    ") ",
    "SELECT EXISTS (SELECT 1 FROM reachable WHERE task_id = $2) AS reachable",
);

/// `PostgreSQL`-backed dependency edge repository.
///
/// Inserts take a transaction-scoped advisory lock keyed by project and
/// re-check reachability before writing, so writers in different processes
/// cannot jointly close a cycle.
#[derive(Debug, Clone)]
pub struct PostgresDependencyRepository {
    pool: DependencyPgPool,
}

/// Failure inside the insert transaction.
enum InsertFailure {
    Database(DieselError),
    Rejected(DependencyRepositoryError),
}

impl From<DieselError> for InsertFailure {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl PostgresDependencyRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DependencyPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DependencyRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DependencyRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DependencyRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DependencyRepositoryError::persistence)?
    }

    async fn load_where<F>(&self, query: F) -> DependencyRepositoryResult<Vec<DependencyEdge>>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<Vec<DependencyRow>> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            let rows = query(connection).map_err(DependencyRepositoryError::persistence)?;
            rows.into_iter().map(row_to_edge).collect()
        })
        .await
    }
}

#[async_trait]
impl DependencyRepository for PostgresDependencyRepository {
    async fn insert_edge(&self, edge: &DependencyEdge) -> DependencyRepositoryResult<EdgeId> {
        let edge_id = edge.id();
        let project_id = edge.project_id();
        let source_task_id = edge.source_task_id();
        let target_task_id = edge.target_task_id();
        let new_row = to_new_row(edge);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, InsertFailure, _>(|tx| {
                    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
                        .bind::<Text, _>(project_id.to_string())
                        .execute(tx)?;

                    let probe = diesel::sql_query(REACHABILITY_SQL)
                        .bind::<SqlUuid, _>(target_task_id.into_inner())
                        .bind::<SqlUuid, _>(source_task_id.into_inner())
                        .get_result::<ReachabilityRow>(tx)?;
                    if probe.reachable {
                        return Err(InsertFailure::Rejected(
                            DependencyRepositoryError::CycleDetected {
                                source_task_id,
                                target_task_id,
                            },
                        ));
                    }

                    diesel::insert_into(task_dependencies::table)
                        .values(&new_row)
                        .execute(tx)?;
                    Ok(())
                })
                .map_err(|failure| match failure {
                    InsertFailure::Rejected(err) => err,
                    InsertFailure::Database(DieselError::DatabaseError(
                        DatabaseErrorKind::UniqueViolation,
                        _,
                    )) => DependencyRepositoryError::DuplicateEdge {
                        source_task_id,
                        target_task_id,
                    },
                    InsertFailure::Database(err) => DependencyRepositoryError::persistence(err),
                })?;
            Ok(edge_id)
        })
        .await
    }

    async fn delete_edge(
        &self,
        source_task_id: TaskId,
        target_task_id: TaskId,
    ) -> DependencyRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                task_dependencies::table
                    .filter(task_dependencies::task_id.eq(source_task_id.into_inner()))
                    .filter(
                        task_dependencies::dependency_task_id.eq(target_task_id.into_inner()),
                    ),
            )
            .execute(connection)
            .map_err(DependencyRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_edges_for_task(&self, task_id: TaskId) -> DependencyRepositoryResult<usize> {
        let id = task_id.into_inner();
        self.run_blocking(move |connection| {
            diesel::delete(
                task_dependencies::table.filter(
                    task_dependencies::task_id
                        .eq(id)
                        .or(task_dependencies::dependency_task_id.eq(id)),
                ),
            )
            .execute(connection)
            .map_err(DependencyRepositoryError::persistence)
        })
        .await
    }

    async fn list_by_source(
        &self,
        task_id: TaskId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        let id = task_id.into_inner();
        self.load_where(move |connection| {
            task_dependencies::table
                .filter(task_dependencies::task_id.eq(id))
                .order((task_dependencies::created_at.asc(), task_dependencies::id.asc()))
                .select(DependencyRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn list_by_target(
        &self,
        task_id: TaskId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        let id = task_id.into_inner();
        self.load_where(move |connection| {
            task_dependencies::table
                .filter(task_dependencies::dependency_task_id.eq(id))
                .order((task_dependencies::created_at.asc(), task_dependencies::id.asc()))
                .select(DependencyRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        let id = project_id.into_inner();
        self.load_where(move |connection| {
            task_dependencies::table
                .filter(task_dependencies::project_id.eq(id))
                .order((task_dependencies::created_at.asc(), task_dependencies::id.asc()))
                .select(DependencyRow::as_select())
                .load(connection)
        })
        .await
    }
}

fn to_new_row(edge: &DependencyEdge) -> NewDependencyRow {
    NewDependencyRow {
        id: edge.id().into_inner(),
        project_id: edge.project_id().into_inner(),
        task_id: edge.source_task_id().into_inner(),
        dependency_task_id: edge.target_task_id().into_inner(),
        dependency_type: edge.dependency_type().as_str().to_owned(),
        created_at: edge.created_at(),
    }
}

fn row_to_edge(row: DependencyRow) -> DependencyRepositoryResult<DependencyEdge> {
    let dependency_type = DependencyType::try_from(row.dependency_type.as_str())
        .map_err(DependencyRepositoryError::persistence)?;

    Ok(DependencyEdge::from_persisted(PersistedEdgeData {
        id: EdgeId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        source_task_id: TaskId::from_uuid(row.task_id),
        target_task_id: TaskId::from_uuid(row.dependency_task_id),
        dependency_type,
        created_at: row.created_at,
    }))
}
