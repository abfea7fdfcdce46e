use std::time::Duration;

use oficina::model::event::AuthEvent;
use oficina::service::events::spawn_event_pump;
use oficina::store::SessionCache;
use oficina_test_utils::prelude::*;

use crate::setup::{controller_for, test_session};

#[tokio::test]
/// Expect a burst of sign-in events to coalesce into a single profile fetch
async fn test_event_burst_coalesces_to_single_fetch() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_profile("manager", 1)
        .with_tenant(1)
        .build()
        .await?;
    let controller = controller_for(&test);
    let pump = spawn_event_pump(controller.bootstrap.clone(), controller.events);

    // Three events inside the debounce window: only the last survivor is handled.
    for _ in 0..3 {
        controller
            .bootstrap
            .events()
            .emit(AuthEvent::signed_in(test_session()));
    }

    tokio::time::sleep(Duration::from_millis(400)).await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(snapshot.is_authenticated());
    assert!(!snapshot.loading);

    // The profile endpoint saw exactly one fetch.
    test.assert_mocks();

    pump.abort();

    Ok(())
}

#[tokio::test]
/// Expect an event arriving mid-handling to be skipped, not queued
async fn test_overlapping_event_is_skipped() -> Result<(), TestError> {
    // The first handler stays busy through three failing attempts (retry backoff
    // keeps it in flight); the second sign-in lands during that window and must not
    // trigger a second fetch sequence.
    let test = TestBuilder::new()
        .with_failing_profile(500, 3)
        .build()
        .await?;
    let controller = controller_for(&test);

    let bootstrap = controller.bootstrap.clone();
    let busy_handler = tokio::spawn(async move {
        bootstrap
            .handle_auth_event(AuthEvent::signed_in(test_session()))
            .await;
    });

    tokio::time::sleep(Duration::from_millis(15)).await;
    controller
        .bootstrap
        .handle_auth_event(AuthEvent::signed_in(test_session()))
        .await;

    busy_handler.await.unwrap();

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(snapshot.degraded, "only the first handler ran to completion");
    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect token-refresh events to replace the session without a profile fetch
async fn test_token_refresh_updates_session_only() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let controller = controller_for(&test);

    let mut refreshed = test_session();
    refreshed.access_token = "rotated-access-token".to_string();

    controller
        .bootstrap
        .handle_auth_event(AuthEvent::token_refreshed(refreshed))
        .await;

    let snapshot = controller.bootstrap.store().snapshot();
    let session = snapshot.session.unwrap();
    assert_eq!(session.access_token, "rotated-access-token");
    assert!(snapshot.profile.is_none());
    // The rotated token is persisted for the next launch.
    assert!(controller.cache.load().is_some());

    Ok(())
}
