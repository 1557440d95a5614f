//! Permission port consulted before every dependency mutation.

use crate::dependency::domain::{Principal, ProjectId};
use async_trait::async_trait;

/// Authorisation contract for dependency mutations.
///
/// The engine trusts the verdict without further checks; role lookups
/// (project manager, administrator, named permission) live behind this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Returns `true` when the principal may add or remove dependencies in
    /// the project.
    async fn can_manage_dependencies(&self, principal: &Principal, project_id: ProjectId) -> bool;
}
