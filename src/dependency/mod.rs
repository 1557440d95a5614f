//! Task dependency graph management for Trellis.
//!
//! This module records which tasks of a project depend on which other tasks,
//! rejects edges that would close a cycle, and answers read queries over the
//! resulting directed acyclic graph: direct dependencies and dependents,
//! candidate prerequisites, and per-task blocking state. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
