//! Transient adjacency graph used for reachability and ordering queries.
//!
//! A [`DependencyGraph`] is rebuilt from persisted edges inside a single
//! operation and dropped afterwards. Tasks are mapped onto `petgraph` node
//! indices once, so searches never hash task identifiers per hop.
//!
//! Edge direction follows storage: `source -> target` means the source task
//! depends on the target task.

use super::{DependencyEdge, TaskId};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Closed walk through the dependency graph that an edge would create.
///
/// The first and last entries are the same task. For a rejected edge
/// `source -> target` the path reads `[source, target, ..., source]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CyclePath(Vec<TaskId>);

impl CyclePath {
    /// Returns the shortest closed walk consistent with knowing only that
    /// `target` reaches `source`: `[source, target, source]`.
    #[must_use]
    pub fn unresolved(source: TaskId, target: TaskId) -> Self {
        Self(vec![source, target, source])
    }

    /// Returns the ordered task identifiers of the cycle.
    #[must_use]
    pub fn tasks(&self) -> &[TaskId] {
        &self.0
    }

    /// Returns the distinct tasks on the cycle in walk order.
    #[must_use]
    pub fn members(&self) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .copied()
            .filter(|task_id| seen.insert(*task_id))
            .collect()
    }

    /// Returns the number of edges on the cycle.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Returns `true` when the task lies on the cycle.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.0.contains(&task_id)
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for task_id in &self.0 {
            if !first {
                f.write_str(" -> ")?;
            }
            write!(f, "{task_id}")?;
            first = false;
        }
        Ok(())
    }
}

/// Directed graph over the tasks of one project.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<TaskId, ()>,
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph containing every endpoint of the given edges.
    #[must_use]
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a DependencyEdge>) -> Self {
        Self::with_tasks(std::iter::empty(), edges)
    }

    /// Builds a graph whose node set includes `tasks` even when they have no
    /// edges. Nodes are added in the order given, then edge endpoints.
    #[must_use]
    pub fn with_tasks<'a>(
        tasks: impl IntoIterator<Item = TaskId>,
        edges: impl IntoIterator<Item = &'a DependencyEdge>,
    ) -> Self {
        let mut graph = Self::new();
        for task_id in tasks {
            graph.add_node(task_id);
        }
        for edge in edges {
            graph.add_edge(edge.source_task_id(), edge.target_task_id());
        }
        graph
    }

    /// Adds a task if absent and returns its node index.
    pub fn add_node(&mut self, task_id: TaskId) -> NodeIndex {
        if let Some(existing) = self.node_map.get(&task_id) {
            return *existing;
        }
        let node = self.graph.add_node(task_id);
        self.node_map.insert(task_id, node);
        node
    }

    /// Adds the edge `source -> target`, adding both endpoints.
    ///
    /// Repeated edges are collapsed.
    pub fn add_edge(&mut self, source: TaskId, target: TaskId) {
        let from = self.add_node(source);
        let to = self.add_node(target);
        self.graph.update_edge(from, to, ());
    }

    /// Returns the number of tasks in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of distinct edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` when the task is a node of the graph.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.node_map.contains_key(&task_id)
    }

    /// Finds a path `from -> ... -> to` following stored edge direction.
    ///
    /// The returned path has the fewest hops and includes both endpoints;
    /// `from == to` yields a single-element path.
    #[must_use]
    pub fn find_path(&self, from: TaskId, to: TaskId) -> Option<Vec<TaskId>> {
        if from == to {
            return Some(vec![from]);
        }
        let start = *self.node_map.get(&from)?;
        let goal = *self.node_map.get(&to)?;

        let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut visited = HashSet::from([start]);
        let mut frontier = VecDeque::from([start]);

        while let Some(current) = frontier.pop_front() {
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if !visited.insert(next) {
                    continue;
                }
                parents.insert(next, current);
                if next == goal {
                    return Some(self.reconstruct(&parents, goal));
                }
                frontier.push_back(next);
            }
        }
        None
    }

    /// Checks whether adding `source -> target` would close a cycle.
    ///
    /// A cycle is created iff `source` is already reachable from `target`.
    /// Returns the closed walk `[source, target, ..., source]` when it is.
    #[must_use]
    pub fn would_create_cycle(&self, source: TaskId, target: TaskId) -> Option<CyclePath> {
        if source == target {
            return Some(CyclePath(vec![source, source]));
        }
        let path = self.find_path(target, source)?;
        let mut cycle = Vec::with_capacity(path.len().saturating_add(1));
        cycle.push(source);
        cycle.extend(path);
        Some(CyclePath(cycle))
    }

    /// Returns `true` when the graph contains any directed cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        algo::is_cyclic_directed(&self.graph)
    }

    /// Orders tasks so that every prerequisite precedes its dependents.
    ///
    /// Ties keep insertion order. Returns `None` when the graph has a cycle.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<TaskId>> {
        let mut unmet: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|node| {
                let prerequisites = self
                    .graph
                    .neighbors_directed(node, Direction::Outgoing)
                    .count();
                (node, prerequisites)
            })
            .collect();
        let mut ready: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|node| unmet.get(node) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.graph.node_count());

        while let Some(node) = ready.pop_front() {
            if let Some(task_id) = self.graph.node_weight(node) {
                order.push(*task_id);
            }
            let mut dependents: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .collect();
            dependents.sort_unstable();
            for dependent in dependents {
                if let Some(count) = unmet.get_mut(&dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        (order.len() == self.graph.node_count()).then_some(order)
    }

    fn reconstruct(
        &self,
        parents: &HashMap<NodeIndex, NodeIndex>,
        goal: NodeIndex,
    ) -> Vec<TaskId> {
        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(node) = cursor {
            if let Some(task_id) = self.graph.node_weight(node) {
                path.push(*task_id);
            }
            cursor = parents.get(&node).copied();
        }
        path.reverse();
        path
    }
}
