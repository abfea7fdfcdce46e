use std::time::Duration;

use oficina::model::event::AuthEvent;
use oficina::store::SessionCache;
use oficina_test_utils::prelude::*;

use crate::setup::{controller_with_cached_session, test_session};

#[tokio::test]
/// Expect calling sign_out twice to leave the same terminal state as calling it once
async fn test_sign_out_is_idempotent() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_user_endpoint(1)
        .with_profile("manager", 1)
        .with_tenant(1)
        .with_sign_out_endpoint(1)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;
    assert!(controller.bootstrap.store().snapshot().is_authenticated());

    controller.bootstrap.sign_out().await;
    let first = controller.bootstrap.store().snapshot();

    controller.bootstrap.sign_out().await;
    let second = controller.bootstrap.store().snapshot();

    assert!(!first.is_authenticated());
    assert!(first.session.is_none());
    assert!(first.tenant.is_none());
    assert!(controller.cache.load().is_none());

    // Identical terminal state: the second call changed nothing, and the provider
    // was only told once.
    assert_eq!(first.last_update, second.last_update);
    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect a SIGNED_OUT event during an in-flight profile fetch to win: the final
/// state is fully cleared and the stale fetch never writes over it
async fn test_signed_out_wins_over_inflight_fetch() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_failing_profile(500, 3)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    let bootstrap = controller.bootstrap.clone();
    let inflight = tokio::spawn(async move {
        bootstrap
            .handle_auth_event(AuthEvent::signed_in(test_session()))
            .await;
    });

    // Land the sign-out while the fetch is still retrying.
    tokio::time::sleep(Duration::from_millis(15)).await;
    controller
        .bootstrap
        .handle_auth_event(AuthEvent::signed_out())
        .await;

    inflight.await.unwrap();

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(snapshot.session.is_none());
    assert!(snapshot.profile.is_none());
    assert!(snapshot.tenant.is_none());
    assert!(!snapshot.degraded);
    assert!(controller.cache.load().is_none());

    test.assert_mocks();

    Ok(())
}
