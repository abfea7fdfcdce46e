//! Auth-plane JSON factories and mock endpoint creation utilities.

use mockito::{Matcher, Mock};
use serde_json::{json, Value};

use crate::constant::{
    TEST_ACCESS_TOKEN, TEST_EMAIL, TEST_REFRESH_TOKEN, TEST_TENANT_ID, TEST_USER_ID,
};
use crate::setup::TestSetup;

/// Identity payload as the auth plane returns it.
pub fn user_json() -> Value {
    json!({
        "id": TEST_USER_ID,
        "email": TEST_EMAIL,
        "user_metadata": {
            "tenant_id": TEST_TENANT_ID
        }
    })
}

/// Token grant payload for password and refresh grants.
pub fn session_response_json() -> Value {
    json!({
        "access_token": TEST_ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": TEST_REFRESH_TOKEN,
        "user": user_json()
    })
}

pub struct AuthFixtures<'a> {
    setup: &'a mut TestSetup,
}

impl<'a> AuthFixtures<'a> {
    pub(crate) fn new(setup: &'a mut TestSetup) -> Self {
        Self { setup }
    }

    /// Mock `GET /auth/v1/user` returning the standard identity.
    pub fn create_user_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("GET", "/auth/v1/user")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(user_json().to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock `GET /auth/v1/user` answering with the given error status.
    pub fn create_failing_user_endpoint(
        &mut self,
        status: usize,
        expected_requests: usize,
    ) -> Mock {
        self.setup
            .server
            .mock("GET", "/auth/v1/user")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({ "message": "token is invalid" }).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock the password grant on `POST /auth/v1/token`.
    pub fn create_password_grant_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded(
                "grant_type".to_string(),
                "password".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(session_response_json().to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock the refresh grant on `POST /auth/v1/token`.
    pub fn create_refresh_grant_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded(
                "grant_type".to_string(),
                "refresh_token".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(session_response_json().to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock a refresh grant that rejects the refresh token.
    pub fn create_failing_refresh_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded(
                "grant_type".to_string(),
                "refresh_token".to_string(),
            ))
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error_description": "refresh token is invalid" }).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock `POST /auth/v1/logout`.
    pub fn create_sign_out_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("POST", "/auth/v1/logout")
            .with_status(204)
            .expect(expected_requests)
            .create()
    }

    /// Mock the health probe on `HEAD /auth/v1/health`.
    pub fn create_health_endpoint(&mut self, healthy: bool, expected_requests: usize) -> Mock {
        let status = if healthy { 200 } else { 503 };

        self.setup
            .server
            .mock("HEAD", "/auth/v1/health")
            .with_status(status)
            .expect(expected_requests)
            .create()
    }
}
