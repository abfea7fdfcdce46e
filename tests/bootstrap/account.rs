use std::time::Duration;

use oficina::api::auth::Credentials;
use oficina::error::{auth::AuthError, Error};
use oficina::service::events::spawn_event_pump;
use oficina::store::SessionCache;
use oficina_test_utils::prelude::*;

use crate::setup::{controller_for, controller_with_cached_session};

#[tokio::test]
/// Expect sign-in to flow through the event pump into a fully-loaded state
async fn test_sign_in_loads_profile_via_event_path() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_password_grant(1)
        .with_profile("cashier", 1)
        .with_tenant(1)
        .build()
        .await?;
    let controller = controller_for(&test);
    let pump = spawn_event_pump(controller.bootstrap.clone(), controller.events);

    controller
        .bootstrap
        .sign_in(&Credentials::new(TEST_EMAIL, TEST_PASSWORD))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;

    let snapshot = controller.bootstrap.store().snapshot();
    assert!(snapshot.is_authenticated());
    assert!(!snapshot.loading);
    assert!(controller.cache.load().is_some());

    pump.abort();
    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect rejected credentials to surface as an auth error without touching state
async fn test_sign_in_rejected_credentials() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_mock_endpoint(|server| {
            server
                .mock("POST", "/auth/v1/token")
                .match_query(mockito::Matcher::UrlEncoded(
                    "grant_type".to_string(),
                    "password".to_string(),
                ))
                .with_status(400)
                .with_body(r#"{"error_description":"Invalid login credentials"}"#)
                .expect(1)
                .create()
        })
        .build()
        .await?;
    let controller = controller_for(&test);

    let result = controller
        .bootstrap
        .sign_in(&Credentials::new(TEST_EMAIL, "wrong-password"))
        .await;

    assert!(matches!(
        result,
        Err(Error::AuthError(AuthError::InvalidCredentials))
    ));
    assert!(controller.cache.load().is_none());

    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect an avatar upload to land in storage, patch the profile row, and mirror
/// the public URL into the snapshot
async fn test_update_avatar() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_user_endpoint(1)
        .with_profile("manager", 1)
        .with_tenant(1)
        .build()
        .await?;
    let upload_mock = test.platform().create_avatar_upload_endpoint(1);
    let patch_mock = test.platform().create_profile_update_endpoint(1);
    let controller = controller_with_cached_session(&test);

    controller.bootstrap.initialize().await;

    let url = controller
        .bootstrap
        .update_avatar(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
        .await
        .unwrap();

    assert!(url.contains("/storage/v1/object/public/avatars/"));
    let snapshot = controller.bootstrap.store().snapshot();
    assert_eq!(snapshot.profile.unwrap().avatar_url, Some(url));

    upload_mock.assert();
    patch_mock.assert();
    test.assert_mocks();

    Ok(())
}
