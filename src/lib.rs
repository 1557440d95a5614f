//! Trellis: acyclic task dependency graphs for project planning.
//!
//! This crate records precedence relationships between the tasks of a
//! project, keeps those relationships free of cycles, and derives which
//! tasks are eligible as new prerequisites and which tasks are currently
//! blocked by unmet prerequisites.
//!
//! # Architecture
//!
//! Trellis follows hexagonal architecture principles:
//!
//! - **Domain**: Pure graph types and algorithms with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for task storage, dependency
//!   storage, and permission decisions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`dependency`]: Dependency edges, cycle detection, and blocking state

pub mod dependency;
