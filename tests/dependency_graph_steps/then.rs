//! Then steps for dependency graph BDD scenarios.

use super::world::{AddOutcome, DependencyGraphWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use trellis::dependency::{
    domain::DependencyEdge,
    services::{DependencyGraphError, RemovalOutcome},
};

fn service_result(
    world: &DependencyGraphWorld,
) -> Result<&Result<DependencyEdge, DependencyGraphError>, eyre::Report> {
    match world.last_add.as_ref() {
        Some(AddOutcome::Completed(result)) => Ok(result),
        Some(AddOutcome::Unparsed(err)) => Err(eyre::eyre!("request was not parsed: {err}")),
        None => Err(eyre::eyre!("missing add result")),
    }
}

#[then("the dependency is recorded")]
fn dependency_recorded(world: &DependencyGraphWorld) -> Result<(), eyre::Report> {
    let result = service_result(world)?;
    if let Err(err) = result {
        return Err(eyre::eyre!("expected the dependency to be recorded, got {err}"));
    }
    Ok(())
}

#[then(r#""{source}" lists "{target}" as a prerequisite"#)]
fn lists_prerequisite(
    world: &DependencyGraphWorld,
    source: String,
    target: String,
) -> Result<(), eyre::Report> {
    let target_id = world.task(&target)?;
    let dependencies = run_async(world.service.list_dependencies(world.task(&source)?))
        .wrap_err("list dependencies")?;
    if !dependencies.iter().any(|linked| linked.task.id() == target_id) {
        return Err(eyre::eyre!("{source} does not depend on {target}"));
    }
    Ok(())
}

#[then(r#"the request fails with a cycle through "{first}", "{second}" and "{third}""#)]
fn fails_with_cycle(
    world: &DependencyGraphWorld,
    first: String,
    second: String,
    third: String,
) -> Result<(), eyre::Report> {
    let first_id = world.task(&first)?;
    let expected = [first_id, world.task(&second)?, world.task(&third)?, first_id];
    match service_result(world)? {
        Err(DependencyGraphError::CyclicDependency { path }) if path.tasks() == expected => Ok(()),
        other => Err(eyre::eyre!("expected cycle {expected:?}, got {other:?}")),
    }
}

#[then("the request fails with a self dependency error")]
fn fails_with_self_dependency(world: &DependencyGraphWorld) -> Result<(), eyre::Report> {
    let result = service_result(world)?;
    if !matches!(result, Err(DependencyGraphError::SelfDependency(_))) {
        return Err(eyre::eyre!("expected SelfDependency error, got {result:?}"));
    }
    Ok(())
}

#[then("the request fails with an unknown dependency type error")]
fn fails_with_unknown_type(world: &DependencyGraphWorld) -> Result<(), eyre::Report> {
    if !matches!(world.last_add, Some(AddOutcome::Unparsed(_))) {
        return Err(eyre::eyre!(
            "expected an unknown dependency type, got {:?}",
            world.last_add
        ));
    }
    Ok(())
}

#[then("the request fails with a forbidden error")]
fn fails_with_forbidden(world: &DependencyGraphWorld) -> Result<(), eyre::Report> {
    let result = service_result(world)?;
    if !matches!(result, Err(DependencyGraphError::Forbidden { .. })) {
        return Err(eyre::eyre!("expected Forbidden error, got {result:?}"));
    }
    Ok(())
}

#[then("the project has {count:u64} dependencies")]
fn project_dependency_count(world: &DependencyGraphWorld, count: u64) -> Result<(), eyre::Report> {
    let stored = world.edges.len().wrap_err("count edges")?;
    if u64::try_from(stored).ok() != Some(count) {
        return Err(eyre::eyre!("expected {count} dependencies, found {stored}"));
    }
    Ok(())
}

#[then("the last removal was a no-op")]
fn last_removal_noop(world: &DependencyGraphWorld) -> Result<(), eyre::Report> {
    if world.last_removal != Some(RemovalOutcome::NoOp) {
        return Err(eyre::eyre!(
            "expected a no-op removal, got {:?}",
            world.last_removal
        ));
    }
    Ok(())
}

#[then(r#""{title}" cannot start"#)]
fn cannot_start(world: &DependencyGraphWorld, title: String) -> Result<(), eyre::Report> {
    let state = run_async(world.service.compute_blocking_state(world.task(&title)?))
        .wrap_err("compute blocking state")?;
    if state.can_start() {
        return Err(eyre::eyre!("{title} should be blocked from starting"));
    }
    Ok(())
}

#[then(r#""{title}" can start"#)]
fn can_start(world: &DependencyGraphWorld, title: String) -> Result<(), eyre::Report> {
    let state = run_async(world.service.compute_blocking_state(world.task(&title)?))
        .wrap_err("compute blocking state")?;
    if !state.can_start() {
        return Err(eyre::eyre!("{title} should be free to start"));
    }
    Ok(())
}
