//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! unit testing without database dependencies.

mod dependency;
mod permission;
mod task;

pub use dependency::InMemoryDependencyRepository;
pub use permission::InMemoryPermissionGate;
pub use task::InMemoryTaskRepository;
