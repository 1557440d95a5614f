//! End-to-end project graph scenarios through the service.

use super::helpers::{Site, admin, site};
use rstest::rstest;
use trellis::dependency::{
    domain::{BlockingState, Task, TaskId, TaskStatus},
    services::{AddDependencyRequest, DependencyGraphError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn schedule_orders_prerequisites_first(site: Site) -> Result<(), eyre::Report> {
    let survey = site.task("Survey")?;
    let excavation = site.task("Excavation")?;
    let foundation = site.task("Foundation")?;
    let framing = site.task("Framing")?;
    site.depends(excavation, survey).await?;
    site.depends(foundation, excavation).await?;
    site.depends(framing, foundation).await?;

    let graph = site.service.project_graph(site.project_id).await?;

    eyre::ensure!(graph.tasks.len() == 4, "expected four tasks");
    eyre::ensure!(graph.edges.len() == 3, "expected three edges");
    eyre::ensure!(
        graph.order == Some(vec![survey, excavation, foundation, framing]),
        "unexpected order {:?}",
        graph.order
    );
    let startable: Vec<TaskId> = graph
        .blocking
        .iter()
        .filter(|state| state.can_start())
        .map(BlockingState::task_id)
        .collect();
    eyre::ensure!(startable == vec![survey], "only the survey may start");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn long_cycle_is_rejected_with_full_path(site: Site) -> Result<(), eyre::Report> {
    let one = site.task("One")?;
    let two = site.task("Two")?;
    let three = site.task("Three")?;
    let four = site.task("Four")?;
    site.depends(one, two).await?;
    site.depends(two, three).await?;
    site.depends(three, four).await?;

    let Err(err) = site.depends(four, one).await else {
        eyre::bail!("closing edge should be rejected");
    };

    let Some(DependencyGraphError::CyclicDependency { path }) =
        err.downcast_ref::<DependencyGraphError>()
    else {
        eyre::bail!("expected a cyclic dependency error, got {err:?}");
    };
    eyre::ensure!(
        path.tasks() == [four, one, two, three, four],
        "unexpected cycle {path}"
    );
    eyre::ensure!(
        path.members() == vec![four, one, two, three],
        "unexpected members of {path}"
    );
    eyre::ensure!(site.edges.len()? == 3, "graph should be unchanged");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_to_start_unblocks_once_prerequisite_starts(site: Site) -> Result<(), eyre::Report> {
    let painting = site.task("Painting")?;
    let plastering = site.task("Plastering")?;
    site.service
        .add_dependency(
            AddDependencyRequest::parse(painting, plastering, "SS")?,
            &admin()?,
        )
        .await?;

    let before = site.service.compute_blocking_state(painting).await?;
    eyre::ensure!(!before.can_start(), "painting waits for plastering to start");

    site.tasks.set_status(plastering, TaskStatus::InProgress)?;
    let after = site.service.compute_blocking_state(painting).await?;
    eyre::ensure!(after.can_start(), "painting may start once plastering has");
    eyre::ensure!(after.can_complete(), "start-to-start never blocks completion");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cascades_its_edges(site: Site) -> Result<(), eyre::Report> {
    let a = site.task("A")?;
    let b = site.task("B")?;
    let c = site.task("C")?;
    site.depends(a, b).await?;
    site.depends(c, b).await?;

    site.tasks.remove(b)?;
    let removed = site.service.remove_all_edges_for_task(b).await?;

    eyre::ensure!(removed == 2, "expected two removed edges, got {removed}");
    eyre::ensure!(
        site.service.list_dependencies(a).await?.is_empty(),
        "a should have no prerequisites left"
    );
    let candidates: Vec<TaskId> = site
        .service
        .list_candidate_tasks(site.project_id, a)
        .await?
        .iter()
        .map(Task::id)
        .collect();
    eyre::ensure!(candidates == vec![c], "unexpected candidates {candidates:?}");
    Ok(())
}
