use mockito::{Mock, Server, ServerGuard};

use crate::error::TestError;
use crate::fixtures::{auth::AuthFixtures, platform::PlatformFixtures};

/// Shared mock-backend environment for tests.
///
/// Holds the mockito server playing the hosted platform plus every mock created for
/// it; callers point their `PlatformClient` at [`TestSetup::base_url`].
pub struct TestSetup {
    pub server: ServerGuard,
    pub mocks: Vec<Mock>,
}

impl TestSetup {
    pub async fn new() -> Result<Self, TestError> {
        let server = Server::new_async().await;

        Ok(Self {
            server,
            mocks: Vec::new(),
        })
    }

    pub fn base_url(&self) -> String {
        self.server.url()
    }

    /// Auth-plane mock endpoints (token grants, identity, sign-out).
    pub fn auth(&mut self) -> AuthFixtures<'_> {
        AuthFixtures::new(self)
    }

    /// Data-plane mock endpoints (profiles, tenants, orders).
    pub fn platform(&mut self) -> PlatformFixtures<'_> {
        PlatformFixtures::new(self)
    }

    /// Assert all mock endpoints were called as expected.
    ///
    /// Calls `assert()` on every mock created through the fixtures or the builder to
    /// verify it was invoked the expected number of times.
    ///
    /// # Panics
    /// Panics if any mock endpoint was not called the expected number of times
    pub fn assert_mocks(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }
}
