//! `PostgreSQL` adapters for dependency graph persistence.

mod models;
mod repository;
mod schema;
mod task;

pub use repository::{DependencyPgPool, PostgresDependencyRepository};
pub use task::PostgresTaskRepository;
