//! Connectivity probing against the platform health endpoint.
//!
//! Used only by the liveness heartbeat and by hosts feeding the gate's online/offline
//! input; never for business data.

use std::time::Duration;

use crate::api::PlatformClient;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of an online/offline check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Connectivity {
    Online,
    Offline,
}

pub struct HealthApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> HealthApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// Cheap liveness probe: `HEAD` on the health endpoint, falling back to `GET` for
    /// servers that reject `HEAD`.
    pub async fn probe(&self) -> bool {
        let url = self.client.endpoint("/auth/v1/health");

        let head = self
            .client
            .http()
            .head(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match head {
            Ok(response) if response.status().is_success() => true,
            Ok(response) if response.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => {
                matches!(
                    self.client
                        .http()
                        .get(&url)
                        .timeout(PROBE_TIMEOUT)
                        .send()
                        .await,
                    Ok(fallback) if fallback.status().is_success()
                )
            }
            _ => false,
        }
    }

    pub async fn connectivity(&self) -> Connectivity {
        if self.probe().await {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }
}
