//! Adapter implementations for dependency graph ports.
//!
//! # Available Adapters
//!
//! - [`memory`]: Thread-safe in-memory task store, edge store, and permission
//!   gate for tests and embedding
//! - [`postgres`]: `PostgreSQL` persistence for tasks and edges using Diesel
//!   ORM

pub mod memory;
pub mod postgres;
