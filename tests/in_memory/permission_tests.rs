//! Permission gate grants and revocations.

use rstest::rstest;
use trellis::dependency::{
    adapters::memory::InMemoryPermissionGate,
    domain::{Principal, ProjectId},
    ports::PermissionGate,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn grants_are_scoped_to_a_project() -> Result<(), eyre::Report> {
    let gate = InMemoryPermissionGate::new();
    let manager = Principal::new("pm")?;
    let [site_a, site_b] = [ProjectId::new(), ProjectId::new()];

    eyre::ensure!(
        !gate.can_manage_dependencies(&manager, site_a).await,
        "a fresh gate should deny"
    );
    gate.grant(manager.clone(), site_a);
    eyre::ensure!(
        gate.can_manage_dependencies(&manager, site_a).await,
        "granted project should be allowed"
    );
    eyre::ensure!(
        !gate.can_manage_dependencies(&manager, site_b).await,
        "grant should not leak to other projects"
    );

    gate.revoke(&manager, site_a);
    eyre::ensure!(
        !gate.can_manage_dependencies(&manager, site_a).await,
        "revoked grant should deny"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn administrators_and_open_gates_allow_everything() -> Result<(), eyre::Report> {
    let gate = InMemoryPermissionGate::new();
    let admin = Principal::new("admin")?;
    let guest = Principal::new("guest")?;
    let project_id = ProjectId::new();
    gate.grant_admin(admin.clone());

    eyre::ensure!(
        gate.can_manage_dependencies(&admin, project_id).await,
        "administrator should be allowed"
    );
    eyre::ensure!(
        !gate.can_manage_dependencies(&guest, project_id).await,
        "guest should be denied"
    );
    eyre::ensure!(
        InMemoryPermissionGate::allow_all()
            .can_manage_dependencies(&guest, project_id)
            .await,
        "open gate should allow anyone"
    );
    Ok(())
}
