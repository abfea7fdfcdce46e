//! Declarative test environment builder.
//!
//! Configures which platform endpoints exist before a test runs. All operations are
//! queued and executed during the final `build()` call, which returns the live mock
//! server with every mock registered.

use mockito::Mock;
use serde_json::Value;

use crate::error::TestError;
use crate::fixtures::platform::{profile_json, tenant_json};
use crate::setup::TestSetup;

/// Builder for declarative test initialization.
pub struct TestBuilder {
    user_endpoint: Option<usize>,
    failing_user_endpoint: Option<(usize, usize)>, // (status, expected_requests)
    password_grant: Option<usize>,
    refresh_grant: Option<usize>,
    failing_refresh: Option<usize>,
    sign_out_endpoint: Option<usize>,
    health_endpoint: Option<(bool, usize)>,
    profile_endpoint: Option<(Value, usize)>,
    failing_profile: Option<(usize, usize)>, // (status, expected_requests)
    tenant_endpoint: Option<(Value, usize)>,
    orders_endpoint: Option<(Vec<Value>, usize)>,

    // Custom mock endpoints with full control
    mock_builders: Vec<Box<dyn FnOnce(&mut mockito::ServerGuard) -> Mock>>,
}

impl TestBuilder {
    pub fn new() -> Self {
        Self {
            user_endpoint: None,
            failing_user_endpoint: None,
            password_grant: None,
            refresh_grant: None,
            failing_refresh: None,
            sign_out_endpoint: None,
            health_endpoint: None,
            profile_endpoint: None,
            failing_profile: None,
            tenant_endpoint: None,
            orders_endpoint: None,
            mock_builders: Vec::new(),
        }
    }

    /// Mock a valid identity on `GET /auth/v1/user`.
    pub fn with_user_endpoint(mut self, expected_requests: usize) -> Self {
        self.user_endpoint = Some(expected_requests);
        self
    }

    /// Mock a rejected identity check with the given status.
    pub fn with_failing_user_endpoint(mut self, status: usize, expected_requests: usize) -> Self {
        self.failing_user_endpoint = Some((status, expected_requests));
        self
    }

    pub fn with_password_grant(mut self, expected_requests: usize) -> Self {
        self.password_grant = Some(expected_requests);
        self
    }

    pub fn with_refresh_grant(mut self, expected_requests: usize) -> Self {
        self.refresh_grant = Some(expected_requests);
        self
    }

    pub fn with_failing_refresh(mut self, expected_requests: usize) -> Self {
        self.failing_refresh = Some(expected_requests);
        self
    }

    pub fn with_sign_out_endpoint(mut self, expected_requests: usize) -> Self {
        self.sign_out_endpoint = Some(expected_requests);
        self
    }

    pub fn with_health_endpoint(mut self, healthy: bool, expected_requests: usize) -> Self {
        self.health_endpoint = Some((healthy, expected_requests));
        self
    }

    /// Mock the standard profile row for the given role.
    pub fn with_profile(mut self, role: &str, expected_requests: usize) -> Self {
        self.profile_endpoint = Some((profile_json(role), expected_requests));
        self
    }

    /// Mock a profile read failing with the given status.
    pub fn with_failing_profile(mut self, status: usize, expected_requests: usize) -> Self {
        self.failing_profile = Some((status, expected_requests));
        self
    }

    /// Mock the standard tenant row.
    pub fn with_tenant(mut self, expected_requests: usize) -> Self {
        self.tenant_endpoint = Some((tenant_json(), expected_requests));
        self
    }

    pub fn with_orders(mut self, orders: Vec<Value>, expected_requests: usize) -> Self {
        self.orders_endpoint = Some((orders, expected_requests));
        self
    }

    /// Add a custom mock endpoint with full control.
    ///
    /// Use this for endpoints not covered by the helper methods.
    pub fn with_mock_endpoint<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut mockito::ServerGuard) -> Mock + 'static,
    {
        self.mock_builders.push(Box::new(setup));
        self
    }

    /// Build the test setup, registering every queued mock endpoint.
    pub async fn build(self) -> Result<TestSetup, TestError> {
        let mut setup = TestSetup::new().await?;

        // Custom endpoints are created first to allow proper sequential mockito
        // matching when tests layer error-then-success mocks on the same path.
        let mut mocks = Vec::new();

        for builder in self.mock_builders {
            mocks.push(builder(&mut setup.server));
        }

        if let Some(expected) = self.user_endpoint {
            mocks.push(setup.auth().create_user_endpoint(expected));
        }
        if let Some((status, expected)) = self.failing_user_endpoint {
            mocks.push(setup.auth().create_failing_user_endpoint(status, expected));
        }
        if let Some(expected) = self.password_grant {
            mocks.push(setup.auth().create_password_grant_endpoint(expected));
        }
        if let Some(expected) = self.refresh_grant {
            mocks.push(setup.auth().create_refresh_grant_endpoint(expected));
        }
        if let Some(expected) = self.failing_refresh {
            mocks.push(setup.auth().create_failing_refresh_endpoint(expected));
        }
        if let Some(expected) = self.sign_out_endpoint {
            mocks.push(setup.auth().create_sign_out_endpoint(expected));
        }
        if let Some((healthy, expected)) = self.health_endpoint {
            mocks.push(setup.auth().create_health_endpoint(healthy, expected));
        }
        if let Some((profile, expected)) = self.profile_endpoint {
            mocks.push(setup.platform().create_profile_endpoint(profile, expected));
        }
        if let Some((status, expected)) = self.failing_profile {
            mocks.push(
                setup
                    .platform()
                    .create_failing_profile_endpoint(status, expected),
            );
        }
        if let Some((tenant, expected)) = self.tenant_endpoint {
            mocks.push(setup.platform().create_tenant_endpoint(tenant, expected));
        }
        if let Some((orders, expected)) = self.orders_endpoint {
            mocks.push(setup.platform().create_orders_endpoint(orders, expected));
        }

        // Store mocks in the setup so they live as long as the test
        setup.mocks = mocks;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
