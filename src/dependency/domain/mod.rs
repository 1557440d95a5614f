//! Domain model for task dependency graphs.
//!
//! The dependency domain models tasks as read-only snapshots, dependency
//! edges between them, the transient graph used for reachability checks, and
//! the derived blocking state, while keeping all infrastructure concerns
//! outside of the domain boundary.

mod blocking;
mod edge;
mod error;
mod graph;
mod ids;
mod task;

pub use blocking::{BlockingDependency, BlockingState};
pub use edge::{ConstrainedTransition, DependencyEdge, DependencyType, PersistedEdgeData};
pub use error::{DependencyDomainError, ParseDependencyTypeError, ParseTaskStatusError};
pub use graph::{CyclePath, DependencyGraph};
pub use ids::{EdgeId, Principal, ProjectId, TaskId};
pub use task::{Task, TaskStatus};
