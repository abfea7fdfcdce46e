use std::time::Duration;

use oficina::api::PlatformClient;
use oficina::model::profile::Role;
use oficina::service::bootstrap::SessionBootstrap;
use oficina::store::SessionCache;
use oficina_test_utils::prelude::*;

use crate::setup::{controller_for, controller_with_cached_session, fast_config};

#[tokio::test]
/// Expect an unauthenticated, non-loading state when no session was persisted
async fn test_initialize_without_session() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let controller = controller_for(&test);

    controller.bootstrap.initialize().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(!snapshot.loading);
    assert!(!snapshot.is_authenticated());
    assert!(snapshot.session.is_none());

    Ok(())
}

#[tokio::test]
/// Expect session, profile, and tenant to load when the persisted session validates
async fn test_initialize_with_valid_session() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_user_endpoint(1)
        .with_profile("manager", 1)
        .with_tenant(1)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.is_authenticated());
    assert!(!snapshot.degraded);

    let profile = snapshot.profile.unwrap();
    assert_eq!(profile.role, Role::Manager);
    assert_eq!(profile.name, "Ana Souza");

    let tenant = snapshot.tenant.unwrap();
    assert_eq!(tenant.name, "Assistec Ilhabela");

    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect initialize to leave the loading state within the configured bound even
/// when the session endpoint never responds
async fn test_initialize_forces_loading_complete_on_stall() {
    // A bound-but-never-accepted listener: connections open, responses never come.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let client = PlatformClient::new(base_url, TEST_API_KEY).unwrap();
    let cache = std::sync::Arc::new(oficina::store::MemorySessionCache::default());
    cache.save(&oficina::store::PersistedAuth {
        session: crate::setup::test_session(),
        saved_at: chrono::Utc::now(),
    });

    let mut config = fast_config();
    config.init_timeout_ms = 200;

    let (bootstrap, _events) = SessionBootstrap::new(
        client,
        cache as std::sync::Arc<dyn oficina::store::SessionCache>,
        config,
    );

    let bounded = tokio::time::timeout(Duration::from_secs(5), bootstrap.initialize()).await;

    assert!(bounded.is_ok(), "initialize() must not hang");
    let snapshot = bootstrap.store().snapshot();
    assert!(!snapshot.loading);
    assert!(!snapshot.is_authenticated());
}

#[tokio::test]
/// Expect a transient validation failure to come up unauthenticated while keeping
/// the persisted session for the next launch
async fn test_initialize_transient_failure_keeps_persisted_session(
) -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_failing_user_endpoint(500, 1)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(!snapshot.loading);
    assert!(!snapshot.is_authenticated());
    // The hint survives: a flaky network must not look like a sign-out.
    assert!(controller.cache.load().is_some());

    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect a provider-rejected session (and failed refresh) to clear the persisted hint
async fn test_initialize_rejected_session_clears_cache() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_failing_user_endpoint(401, 1)
        .with_failing_refresh(1)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(!snapshot.is_authenticated());
    assert!(controller.cache.load().is_none());

    test.assert_mocks();

    Ok(())
}
