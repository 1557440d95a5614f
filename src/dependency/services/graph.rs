//! Dependency graph engine.
//!
//! [`DependencyGraphService`] validates and commits edge mutations and answers
//! read queries over a project's dependency graph. It keeps no graph between
//! calls: each operation reads current edges from the repository, and edge
//! insertion re-reads them under the project's commit lock.

use super::{
    DependencyGraphConfig, DependencyGraphError, DependencyGraphResult, DuplicatePolicy,
    ProjectLocks,
};
use crate::dependency::{
    domain::{
        BlockingState, CyclePath, DependencyEdge, DependencyGraph, DependencyType, EdgeId,
        ParseDependencyTypeError, Principal, ProjectId, Task, TaskId,
    },
    ports::{
        DependencyRepository, DependencyRepositoryError, PermissionGate, TaskRepository,
    },
};
use mockable::Clock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for adding a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDependencyRequest {
    source_task_id: TaskId,
    target_task_id: TaskId,
    dependency_type: DependencyType,
}

impl AddDependencyRequest {
    /// Creates a request stating that `source_task_id` depends on
    /// `target_task_id`.
    #[must_use]
    pub const fn new(
        source_task_id: TaskId,
        target_task_id: TaskId,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            source_task_id,
            target_task_id,
            dependency_type,
        }
    }

    /// Creates a request from an untyped dependency type string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseDependencyTypeError`] when the string is not one of the
    /// four dependency types.
    pub fn parse(
        source_task_id: TaskId,
        target_task_id: TaskId,
        dependency_type: &str,
    ) -> Result<Self, ParseDependencyTypeError> {
        let parsed = DependencyType::try_from(dependency_type)?;
        Ok(Self::new(source_task_id, target_task_id, parsed))
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

    /// Returns the requested dependency type.
    #[must_use]
    pub const fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }
}

/// Result of an idempotent dependency removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// An edge was deleted.
    Removed,
    /// No edge existed for the pair; nothing changed.
    NoOp,
}

/// Task at the other end of a direct dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedTask {
    /// Edge connecting the two tasks.
    pub edge_id: EdgeId,
    /// The linked task.
    pub task: Task,
    /// Precedence kind of the edge.
    pub dependency_type: DependencyType,
}

/// Read-only snapshot of a project's dependency graph for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectGraph {
    /// Project the snapshot describes.
    pub project_id: ProjectId,
    /// Every task of the project in task store order.
    pub tasks: Vec<Task>,
    /// Edges whose endpoints are both present in `tasks`.
    pub edges: Vec<DependencyEdge>,
    /// Prerequisite-first ordering, or `None` if the stored edges are cyclic.
    pub order: Option<Vec<TaskId>>,
    /// Blocking state per task, in `tasks` order.
    pub blocking: Vec<BlockingState>,
}

/// Outcome of validating a new edge under the commit lock.
enum Validated {
    /// The pair already has an edge and the policy returns it.
    Existing(DependencyEdge),
    /// The edge passed validation and may be inserted.
    New(DependencyEdge),
}

/// Dependency graph orchestration service.
#[derive(Clone)]
pub struct DependencyGraphService<T, D, P, C>
where
    T: TaskRepository,
    D: DependencyRepository,
    P: PermissionGate,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    dependencies: Arc<D>,
    permissions: Arc<P>,
    clock: Arc<C>,
    config: DependencyGraphConfig,
    locks: ProjectLocks,
}

impl<T, D, P, C> DependencyGraphService<T, D, P, C>
where
    T: TaskRepository,
    D: DependencyRepository,
    P: PermissionGate,
    C: Clock + Send + Sync,
{
    /// Creates a service with default configuration.
    #[must_use]
    pub fn new(tasks: Arc<T>, dependencies: Arc<D>, permissions: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            dependencies,
            permissions,
            clock,
            config: DependencyGraphConfig::default(),
            locks: ProjectLocks::new(),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub const fn with_config(mut self, config: DependencyGraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing lock table, so several service instances over the
    /// same stores serialise their commits.
    #[must_use]
    pub fn with_locks(mut self, locks: ProjectLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub const fn config(&self) -> &DependencyGraphConfig {
        &self.config
    }

    /// Records that the source task depends on the target task.
    ///
    /// Checks run in order and stop at the first failure: the source task
    /// must exist, the principal must be allowed to manage the source task's
    /// project, the endpoints must differ, the target must exist in the same
    /// project, the pair must be new, and the edge must not close a cycle.
    /// The last two checks and the insert run under the project's commit
    /// lock against freshly read edges. If the store itself reports that a
    /// concurrent writer closed a cycle, validation is repeated once so the
    /// error carries the actual cycle path.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::TaskNotFound`],
    /// [`DependencyGraphError::Forbidden`],
    /// [`DependencyGraphError::SelfDependency`],
    /// [`DependencyGraphError::CrossProjectDependency`],
    /// [`DependencyGraphError::DuplicateDependency`],
    /// [`DependencyGraphError::CyclicDependency`] or
    /// [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn add_dependency(
        &self,
        request: AddDependencyRequest,
        principal: &Principal,
    ) -> DependencyGraphResult<DependencyEdge> {
        let source_task_id = request.source_task_id();
        let target_task_id = request.target_task_id();

        let source = match self.tasks.find_by_id(source_task_id).await? {
            Some(task) => task,
            // Without a task there is no project to authorise against.
            None if source_task_id == target_task_id => {
                return Err(DependencyGraphError::SelfDependency(source_task_id));
            }
            None => return Err(DependencyGraphError::TaskNotFound(source_task_id)),
        };
        let project_id = source.project_id();
        self.authorize(principal, project_id).await?;

        if source_task_id == target_task_id {
            return Err(DependencyGraphError::SelfDependency(source_task_id));
        }

        let target = self.require_task(target_task_id).await?;
        if target.project_id() != project_id {
            return Err(DependencyGraphError::CrossProjectDependency {
                source_task_id,
                source_project_id: project_id,
                target_task_id,
                target_project_id: target.project_id(),
            });
        }

        let _commit = self.locks.acquire(project_id).await;
        debug!(project = %project_id, "acquired dependency commit lock");

        let mut revalidated = false;
        loop {
            let edge = match self.validate_new_edge(project_id, request).await? {
                Validated::Existing(existing) => return Ok(existing),
                Validated::New(edge) => edge,
            };
            match self.dependencies.insert_edge(&edge).await {
                Ok(_) => {
                    info!(
                        edge = %edge.id(),
                        project = %project_id,
                        source_task = %source_task_id,
                        target_task = %target_task_id,
                        dependency_type = %edge.dependency_type(),
                        "dependency added"
                    );
                    return Ok(edge);
                }
                // Another process committed a conflicting edge after our read.
                Err(DependencyRepositoryError::CycleDetected { .. }) if !revalidated => {
                    warn!(
                        project = %project_id,
                        "store reported a concurrent cycle, revalidating"
                    );
                    revalidated = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Removes the dependency of the source task on the target task.
    ///
    /// Idempotent: removing an absent edge reports
    /// [`RemovalOutcome::NoOp`]. Permission is checked against the source
    /// task's project, or against the edge's project when the source task
    /// no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::Forbidden`] or
    /// [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn remove_dependency(
        &self,
        source_task_id: TaskId,
        target_task_id: TaskId,
        principal: &Principal,
    ) -> DependencyGraphResult<RemovalOutcome> {
        let project_id = match self.tasks.find_by_id(source_task_id).await? {
            Some(task) => Some(task.project_id()),
            None => self
                .dependencies
                .list_by_source(source_task_id)
                .await?
                .iter()
                .find(|edge| edge.connects(source_task_id, target_task_id))
                .map(DependencyEdge::project_id),
        };
        let Some(project_id) = project_id else {
            debug!(
                source_task = %source_task_id,
                target_task = %target_task_id,
                "dependency removal found neither task nor edge"
            );
            return Ok(RemovalOutcome::NoOp);
        };
        self.authorize(principal, project_id).await?;

        let removed = self
            .dependencies
            .delete_edge(source_task_id, target_task_id)
            .await?;
        if removed {
            info!(
                project = %project_id,
                source_task = %source_task_id,
                target_task = %target_task_id,
                "dependency removed"
            );
            Ok(RemovalOutcome::Removed)
        } else {
            debug!(
                source_task = %source_task_id,
                target_task = %target_task_id,
                "dependency already absent"
            );
            Ok(RemovalOutcome::NoOp)
        }
    }

    /// Reports whether adding `source -> target` would close a cycle.
    ///
    /// Advisory only; `add_dependency` re-checks at commit time. Returns the
    /// cycle path when one would be created. Tasks in different projects
    /// never form a cycle here (such an edge is rejected for other reasons).
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::TaskNotFound`] or
    /// [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn would_create_cycle(
        &self,
        source_task_id: TaskId,
        target_task_id: TaskId,
    ) -> DependencyGraphResult<Option<CyclePath>> {
        let source = self.require_task(source_task_id).await?;
        if source_task_id == target_task_id {
            return Ok(DependencyGraph::new().would_create_cycle(source_task_id, target_task_id));
        }
        let target = self.require_task(target_task_id).await?;
        if target.project_id() != source.project_id() {
            return Ok(None);
        }

        let edges = self.dependencies.list_by_project(source.project_id()).await?;
        Ok(DependencyGraph::from_edges(&edges).would_create_cycle(source_task_id, target_task_id))
    }

    /// Lists tasks that may be offered as new prerequisites of `task_id`.
    ///
    /// Excludes the task itself and its current prerequisites. Candidates
    /// that would close a cycle are kept; `add_dependency` rejects them.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn list_candidate_tasks(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> DependencyGraphResult<Vec<Task>> {
        let tasks = self.tasks.list_by_project(project_id).await?;
        let existing: HashSet<TaskId> = self
            .dependencies
            .list_by_source(task_id)
            .await?
            .iter()
            .map(DependencyEdge::target_task_id)
            .collect();

        Ok(tasks
            .into_iter()
            .filter(|task| task.id() != task_id && !existing.contains(&task.id()))
            .collect())
    }

    /// Lists the direct prerequisites of a task.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn list_dependencies(
        &self,
        task_id: TaskId,
    ) -> DependencyGraphResult<Vec<LinkedTask>> {
        let edges = self.dependencies.list_by_source(task_id).await?;
        self.link(edges, DependencyEdge::target_task_id).await
    }

    /// Lists the tasks that directly depend on a task.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn list_dependents(
        &self,
        task_id: TaskId,
    ) -> DependencyGraphResult<Vec<LinkedTask>> {
        let edges = self.dependencies.list_by_target(task_id).await?;
        self.link(edges, DependencyEdge::source_task_id).await
    }

    /// Derives whether the task is currently blocked from starting or
    /// completing, and by which prerequisites.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::TaskNotFound`] or
    /// [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn compute_blocking_state(
        &self,
        task_id: TaskId,
    ) -> DependencyGraphResult<BlockingState> {
        self.require_task(task_id).await?;
        let dependencies = self.list_dependencies(task_id).await?;
        Ok(BlockingState::evaluate(
            task_id,
            dependencies
                .into_iter()
                .map(|linked| (linked.task, linked.dependency_type)),
        ))
    }

    /// Removes every edge touching the task.
    ///
    /// Invoked by the task store while deleting a task; no permission check
    /// is made. Returns the number of edges removed.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn remove_all_edges_for_task(&self, task_id: TaskId) -> DependencyGraphResult<usize> {
        let removed = self.dependencies.delete_edges_for_task(task_id).await?;
        info!(task = %task_id, removed, "removed dependency edges for task");
        Ok(removed)
    }

    /// Builds a rendering snapshot of the project's tasks and edges.
    ///
    /// Edges whose endpoints are missing from the task store are left out.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::RepositoryUnavailable`].
    pub async fn project_graph(
        &self,
        project_id: ProjectId,
    ) -> DependencyGraphResult<ProjectGraph> {
        let tasks = self.tasks.list_by_project(project_id).await?;
        let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id(), task)).collect();

        let edges: Vec<DependencyEdge> = self
            .dependencies
            .list_by_project(project_id)
            .await?
            .into_iter()
            .filter(|edge| {
                let present = by_id.contains_key(&edge.source_task_id())
                    && by_id.contains_key(&edge.target_task_id());
                if !present {
                    warn!(edge = %edge.id(), "skipping dangling dependency edge");
                }
                present
            })
            .collect();

        let graph = DependencyGraph::with_tasks(tasks.iter().map(Task::id), &edges);
        let order = graph.topological_order();
        if order.is_none() {
            warn!(project = %project_id, "stored dependency edges contain a cycle");
        }

        let blocking = tasks
            .iter()
            .map(|task| {
                let dependencies = edges
                    .iter()
                    .filter(|edge| edge.source_task_id() == task.id())
                    .filter_map(|edge| {
                        by_id
                            .get(&edge.target_task_id())
                            .map(|target| ((*target).clone(), edge.dependency_type()))
                    });
                BlockingState::evaluate(task.id(), dependencies)
            })
            .collect();

        Ok(ProjectGraph {
            project_id,
            tasks,
            edges,
            order,
            blocking,
        })
    }

    /// Runs the duplicate and cycle checks against freshly read edges.
    ///
    /// Callers must hold the project's commit lock.
    async fn validate_new_edge(
        &self,
        project_id: ProjectId,
        request: AddDependencyRequest,
    ) -> DependencyGraphResult<Validated> {
        let source_task_id = request.source_task_id();
        let target_task_id = request.target_task_id();
        let edges = self.dependencies.list_by_project(project_id).await?;

        if let Some(existing) = edges
            .iter()
            .find(|edge| edge.connects(source_task_id, target_task_id))
        {
            return match self.config.duplicate_policy {
                DuplicatePolicy::Reject => Err(DependencyGraphError::DuplicateDependency {
                    source_task_id,
                    target_task_id,
                }),
                DuplicatePolicy::ReturnExisting => {
                    debug!(edge = %existing.id(), "dependency already recorded");
                    Ok(Validated::Existing(existing.clone()))
                }
            };
        }

        let graph = DependencyGraph::from_edges(&edges);
        debug!(
            project = %project_id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "checking dependency for cycles"
        );
        if let Some(path) = graph.would_create_cycle(source_task_id, target_task_id) {
            warn!(
                source_task = %source_task_id,
                target_task = %target_task_id,
                %path,
                "rejected dependency that would create a cycle"
            );
            return Err(DependencyGraphError::CyclicDependency { path });
        }

        let edge = DependencyEdge::new(
            project_id,
            source_task_id,
            target_task_id,
            request.dependency_type(),
            &*self.clock,
        )?;
        Ok(Validated::New(edge))
    }

    async fn require_task(&self, task_id: TaskId) -> DependencyGraphResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(DependencyGraphError::TaskNotFound(task_id))
    }

    async fn authorize(
        &self,
        principal: &Principal,
        project_id: ProjectId,
    ) -> DependencyGraphResult<()> {
        if self
            .permissions
            .can_manage_dependencies(principal, project_id)
            .await
        {
            return Ok(());
        }
        warn!(%principal, project = %project_id, "dependency mutation forbidden");
        Err(DependencyGraphError::Forbidden {
            principal: principal.clone(),
            project_id,
        })
    }

    async fn link(
        &self,
        edges: Vec<DependencyEdge>,
        other_end: fn(&DependencyEdge) -> TaskId,
    ) -> DependencyGraphResult<Vec<LinkedTask>> {
        let mut linked = Vec::with_capacity(edges.len());
        for edge in edges {
            let task_id = other_end(&edge);
            let Some(task) = self.tasks.find_by_id(task_id).await? else {
                warn!(edge = %edge.id(), task = %task_id, "skipping edge to missing task");
                continue;
            };
            linked.push(LinkedTask {
                edge_id: edge.id(),
                task,
                dependency_type: edge.dependency_type(),
            });
        }
        Ok(linked)
    }
}
