//! Edge store behaviour of the in-memory dependency repository.

use mockable::DefaultClock;
use rstest::rstest;
use trellis::dependency::{
    adapters::memory::InMemoryDependencyRepository,
    domain::{DependencyEdge, DependencyType, ProjectId, TaskId},
    ports::{DependencyRepository, DependencyRepositoryError},
};

fn edge(
    project_id: ProjectId,
    source: TaskId,
    target: TaskId,
) -> Result<DependencyEdge, eyre::Report> {
    Ok(DependencyEdge::new(
        project_id,
        source,
        target,
        DependencyType::FinishToStart,
        &DefaultClock,
    )?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn insert_rejects_second_edge_for_pair() -> Result<(), eyre::Report> {
    let repo = InMemoryDependencyRepository::new();
    let project_id = ProjectId::new();
    let [a, b] = [TaskId::new(), TaskId::new()];

    let first = edge(project_id, a, b)?;
    let stored_id = repo.insert_edge(&first).await?;
    let result = repo.insert_edge(&edge(project_id, a, b)?).await;

    eyre::ensure!(stored_id == first.id(), "insert should return the edge id");
    eyre::ensure!(
        matches!(
            result,
            Err(DependencyRepositoryError::DuplicateEdge { source_task_id, target_task_id })
                if source_task_id == a && target_task_id == b
        ),
        "expected a duplicate edge error, got {result:?}"
    );
    // The reverse pair is a different edge as far as storage is concerned.
    repo.insert_edge(&edge(project_id, b, a)?).await?;
    eyre::ensure!(repo.len()? == 2, "expected two stored edges");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_filter_by_endpoint_and_project() -> Result<(), eyre::Report> {
    let repo = InMemoryDependencyRepository::new();
    let project_id = ProjectId::new();
    let other_project = ProjectId::new();
    let [a, b, c, x, y] = [
        TaskId::new(),
        TaskId::new(),
        TaskId::new(),
        TaskId::new(),
        TaskId::new(),
    ];
    repo.insert_edge(&edge(project_id, a, b)?).await?;
    repo.insert_edge(&edge(project_id, a, c)?).await?;
    repo.insert_edge(&edge(project_id, c, b)?).await?;
    repo.insert_edge(&edge(other_project, x, y)?).await?;

    let from_a: Vec<TaskId> = repo
        .list_by_source(a)
        .await?
        .iter()
        .map(DependencyEdge::target_task_id)
        .collect();
    let into_b: Vec<TaskId> = repo
        .list_by_target(b)
        .await?
        .iter()
        .map(DependencyEdge::source_task_id)
        .collect();

    eyre::ensure!(from_a == vec![b, c], "unexpected prerequisites {from_a:?}");
    eyre::ensure!(into_b == vec![a, c], "unexpected dependents {into_b:?}");
    eyre::ensure!(
        repo.list_by_project(project_id).await?.len() == 3,
        "project listing should hold three edges"
    );
    eyre::ensure!(
        repo.list_by_project(other_project).await?.len() == 1,
        "other project should hold one edge"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletes_report_whether_anything_changed() -> Result<(), eyre::Report> {
    let repo = InMemoryDependencyRepository::new();
    let project_id = ProjectId::new();
    let [a, b, c] = [TaskId::new(), TaskId::new(), TaskId::new()];
    repo.insert_edge(&edge(project_id, a, b)?).await?;
    repo.insert_edge(&edge(project_id, b, c)?).await?;
    repo.insert_edge(&edge(project_id, c, a)?).await?;

    eyre::ensure!(repo.delete_edge(a, b).await?, "first delete should remove");
    eyre::ensure!(!repo.delete_edge(a, b).await?, "second delete should be a no-op");
    let cascaded = repo.delete_edges_for_task(c).await?;
    eyre::ensure!(cascaded == 2, "expected two cascaded edges, got {cascaded}");
    eyre::ensure!(repo.is_empty()?, "store should be empty");
    Ok(())
}
