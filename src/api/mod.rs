//! HTTP client for the hosted platform backend.
//!
//! The backend exposes an auth plane (token grants, identity validation), a data plane
//! (tenant-scoped table reads/writes behind a uniform query interface), object storage,
//! and a health endpoint for connectivity probing. All wire-level concerns live here;
//! the service layer never builds requests by hand.

pub mod auth;
pub mod health;
pub mod storage;
pub mod table;

use crate::config::Config;
use crate::error::{api::ApiError, Error};
use crate::model::api::ApiErrorBody;

pub use auth::{AuthApi, Credentials};
pub use health::{Connectivity, HealthApi};
pub use storage::StorageApi;
pub use table::TableQuery;

/// Client for the hosted platform backend.
///
/// Cheap to clone; holds a shared connection pool.
#[derive(Clone, Debug)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlatformClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(&config.base_url, &config.api_key)
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Start a query against a data-plane table.
    pub fn table(&self, name: &str) -> TableQuery<'_> {
        TableQuery::new(self, name)
    }

    pub fn storage(&self) -> StorageApi<'_> {
        StorageApi::new(self)
    }

    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(self)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Reject non-success responses, classifying them into [`ApiError`].
///
/// 401/403 responses keep their status so the caller (and the retry classifier) can
/// recognize them as authentication failures.
pub(crate) async fn check_response(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    Err(ApiError::RequestFailed {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    }
    .into())
}

/// Decode a successful response body, attributing failures to the endpoint.
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, Error> {
    let bytes = response.bytes().await?;

    serde_json::from_slice(&bytes).map_err(|err| {
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
        .into()
    })
}
