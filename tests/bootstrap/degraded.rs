use oficina::model::profile::{Role, DEFAULT_PERMISSION};
use oficina_test_utils::prelude::*;

use crate::setup::controller_with_cached_session;

#[tokio::test]
/// Expect a session-derived fallback profile after the profile fetch exhausts all
/// retry attempts: never a blank authenticated state
async fn test_profile_fetch_exhaustion_degrades_to_session_claims(
) -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_user_endpoint(1)
        .with_failing_profile(500, 3)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.session.is_some(), "transient failures keep the session");
    assert!(snapshot.degraded);

    let profile = snapshot.profile.expect("degraded state still has a profile");
    // Derived purely from session claims: email local part, default role.
    assert_eq!(profile.name, "tech");
    assert_eq!(profile.email, TEST_EMAIL);
    assert_eq!(profile.role, Role::Attendant);
    assert!(profile.has_permission(DEFAULT_PERMISSION));

    assert!(snapshot.tenant.is_none());

    // Exactly max_attempts fetches, no more.
    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect a missing profile row to degrade without retry storms and without
/// clearing the session
async fn test_missing_profile_row_degrades_without_retry() -> Result<(), TestError> {
    // 406 is the data plane's "no row matched" answer for single-object reads; a data
    // error, so exactly one attempt.
    let test = TestBuilder::new()
        .with_user_endpoint(1)
        .with_failing_profile(406, 1)
        .build()
        .await?;
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(snapshot.session.is_some());
    assert!(snapshot.degraded);
    assert!(snapshot.profile.is_some());

    test.assert_mocks();

    Ok(())
}
