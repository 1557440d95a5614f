//! In-memory permission gate.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::dependency::{
    domain::{Principal, ProjectId},
    ports::PermissionGate,
};

/// Permission gate backed by an explicit grant list.
///
/// Principals may be granted management rights per project or for every
/// project (administrators).
#[derive(Debug, Clone, Default)]
pub struct InMemoryPermissionGate {
    grants: Arc<RwLock<Grants>>,
}

#[derive(Debug, Default)]
struct Grants {
    allow_all: bool,
    administrators: HashSet<Principal>,
    project_managers: HashSet<(Principal, ProjectId)>,
}

impl InMemoryPermissionGate {
    /// Creates a gate that denies everyone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate that allows every principal in every project.
    #[must_use]
    pub fn allow_all() -> Self {
        let gate = Self::default();
        gate.update(|grants| grants.allow_all = true);
        gate
    }

    /// Grants the principal dependency management in one project.
    pub fn grant(&self, principal: Principal, project_id: ProjectId) {
        self.update(|grants| {
            grants.project_managers.insert((principal, project_id));
        });
    }

    /// Grants the principal dependency management in every project.
    pub fn grant_admin(&self, principal: Principal) {
        self.update(|grants| {
            grants.administrators.insert(principal);
        });
    }

    /// Withdraws a per-project grant.
    pub fn revoke(&self, principal: &Principal, project_id: ProjectId) {
        self.update(|grants| {
            grants
                .project_managers
                .retain(|(granted, granted_project)| {
                    granted != principal || *granted_project != project_id
                });
        });
    }

    fn update(&self, change: impl FnOnce(&mut Grants)) {
        // A poisoned grant list still holds consistent sets; recover it.
        let mut grants = self
            .grants
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        change(&mut grants);
    }
}

#[async_trait]
impl PermissionGate for InMemoryPermissionGate {
    async fn can_manage_dependencies(&self, principal: &Principal, project_id: ProjectId) -> bool {
        let grants = self
            .grants
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        grants.allow_all
            || grants.administrators.contains(principal)
            || grants
                .project_managers
                .contains(&(principal.clone(), project_id))
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "Test setup uses expect for assertion clarity"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::PoisonError;

    fn poison(gate: &InMemoryPermissionGate) {
        let grants = Arc::clone(&gate.grants);
        let outcome = std::thread::spawn(move || {
            let _held = grants.write().unwrap_or_else(PoisonError::into_inner);
            panic!("writer died holding the grant list");
        })
        .join();
        assert!(outcome.is_err());
        assert!(gate.grants.is_poisoned());
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn poisoned_grants_are_read_like_they_are_written() {
        let gate = InMemoryPermissionGate::new();
        let manager = Principal::new("pm").expect("valid principal");
        let [granted, other] = [ProjectId::new(), ProjectId::new()];
        gate.grant(manager.clone(), granted);

        poison(&gate);

        assert!(gate.can_manage_dependencies(&manager, granted).await);
        assert!(!gate.can_manage_dependencies(&manager, other).await);
        gate.grant(manager.clone(), other);
        assert!(gate.can_manage_dependencies(&manager, other).await);
        gate.revoke(&manager, granted);
        assert!(!gate.can_manage_dependencies(&manager, granted).await);
    }
}
