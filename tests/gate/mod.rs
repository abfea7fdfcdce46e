use std::sync::Arc;

use oficina::api::health::Connectivity;
use oficina::model::profile::Role;
use oficina::service::gate::{
    AccessRequirement, GateConfig, GateDecision, ProtectedGate, RedirectGuard, RedirectTarget,
};
use oficina_test_utils::prelude::*;

use crate::setup::controller_with_cached_session;

#[tokio::test]
/// Expect a gate over a live bootstrap to redirect to access-denied when the
/// fetched role is below the requirement, and to authorize a matching one
async fn test_gate_against_bootstrapped_state() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_user_endpoint(1)
        .with_profile("technician", 1)
        .with_tenant(1)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;
    let snapshot = controller.bootstrap.store().snapshot();

    let guard = Arc::new(RedirectGuard::new(GateConfig::default()));

    let mut admin_gate = ProtectedGate::new(AccessRequirement::role(Role::Admin), guard.clone());
    assert_eq!(
        admin_gate.evaluate(&snapshot, Connectivity::Online),
        GateDecision::Redirect(RedirectTarget::AccessDenied)
    );

    let mut technician_gate =
        ProtectedGate::new(AccessRequirement::role(Role::Technician), guard.clone());
    assert_eq!(
        technician_gate.evaluate(&snapshot, Connectivity::Online),
        GateDecision::RenderChildren
    );

    Ok(())
}

#[tokio::test]
/// Expect gates to show loading, not redirect, before the bootstrap finishes
async fn test_gate_waits_for_bootstrap() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let controller = controller_with_cached_session(&test);

    // Evaluated before initialize(): the snapshot still reports loading.
    let snapshot = controller.bootstrap.store().snapshot();
    let guard = Arc::new(RedirectGuard::new(GateConfig::default()));
    let mut gate = ProtectedGate::new(AccessRequirement::level(1), guard);

    assert_eq!(
        gate.evaluate(&snapshot, Connectivity::Online),
        GateDecision::ShowLoading
    );

    Ok(())
}
