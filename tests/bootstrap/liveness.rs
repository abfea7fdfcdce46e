use std::time::Duration;

use oficina::model::event::AuthEvent;
use oficina::service::heartbeat::spawn_heartbeat;
use oficina::store::SessionCache;
use oficina_test_utils::prelude::*;

use crate::setup::{controller_for, test_session};

#[tokio::test]
/// Expect the heartbeat to clear all state once the provider invalidates the session
async fn test_heartbeat_clears_invalidated_session() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_profile("manager", 1)
        .with_tenant(1)
        .with_failing_user_endpoint(401, 1)
        .with_failing_refresh(1)
        .build()
        .await?;
    let controller = controller_for(&test);
    let heartbeat = spawn_heartbeat(controller.bootstrap.clone());

    controller
        .bootstrap
        .handle_auth_event(AuthEvent::signed_in(test_session()))
        .await;
    assert!(controller.bootstrap.store().snapshot().is_authenticated());

    // One heartbeat tick (interval 100ms) hits the rejected identity endpoint, the
    // refresh fallback fails, and everything is cleared.
    tokio::time::sleep(Duration::from_millis(180)).await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(snapshot.session.is_none());
    assert!(snapshot.profile.is_none());
    assert!(controller.cache.load().is_none());

    heartbeat.abort();
    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect a transient liveness failure to keep the session (availability over
/// immediate consistency)
async fn test_transient_liveness_failure_keeps_session() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_profile("manager", 1)
        .with_tenant(1)
        .with_failing_user_endpoint(500, 1)
        .with_health_endpoint(true, 1)
        .build()
        .await?;
    let controller = controller_for(&test);

    controller
        .bootstrap
        .handle_auth_event(AuthEvent::signed_in(test_session()))
        .await;

    // Past the focus-recheck window, so the foreground check actually runs.
    tokio::time::sleep(Duration::from_millis(60)).await;
    controller.bootstrap.on_foreground().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(
        snapshot.is_authenticated(),
        "network failures must never sign the user out"
    );

    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect a foreground recheck within the validation window to be skipped
async fn test_focus_recheck_skipped_within_window() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_profile("manager", 1)
        .with_tenant(1)
        .with_user_endpoint(0)
        .build()
        .await?;
    let controller = controller_for(&test);

    controller
        .bootstrap
        .handle_auth_event(AuthEvent::signed_in(test_session()))
        .await;

    // Sign-in just validated the session; an immediate focus event is redundant.
    controller.bootstrap.on_foreground().await;

    test.assert_mocks();

    Ok(())
}
