//! Error types for the Oficina client SDK.
//!
//! This module provides the error handling system for the SDK, with specialized error types
//! for different domains (authentication, platform API, configuration). All errors use
//! `thiserror` for ergonomic definitions, and every error can be classified for retry
//! decisions via [`Error::to_retry_strategy`] and for session handling via
//! [`Error::is_auth_error`].

pub mod api;
pub mod auth;
pub mod config;
pub mod retry;

use thiserror::Error;

use crate::error::{api::ApiError, auth::AuthError, config::ConfigError};

/// Main error type for the Oficina SDK.
///
/// Aggregates all domain-specific error types and external library errors into a single
/// unified error type, using `thiserror`'s `#[from]` attribute so underlying errors
/// convert automatically via the `?` operator.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Authentication error (missing session, rejected credentials, failed refresh).
    #[error(transparent)]
    AuthError(#[from] AuthError),
    /// Platform API error (failed requests, timeouts, missing rows, decode failures).
    #[error(transparent)]
    ApiError(#[from] ApiError),
    /// Parse error (failed to parse a value from string or other format).
    #[error("Failed to parse value: {0:?}")]
    ParseError(String),
    /// Internal error indicating a bug in the SDK's own code.
    #[error("Internal error within the Oficina SDK, this indicates a bug: {0:?}")]
    InternalError(String),
    /// Transport-level HTTP error (connection failures, TLS, malformed responses).
    #[error(transparent)]
    HttpError(#[from] reqwest::Error),
    /// JSON serialization error.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// True when the error means the session itself was rejected by the auth provider.
    ///
    /// Only errors in this class may clear cached session state; network failures and
    /// timeouts never do, so a flaky connection cannot log the user out.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::AuthError(_) => true,
            Self::ApiError(ApiError::RequestFailed { status, .. }) => {
                *status == 401 || *status == 403
            }
            Self::HttpError(err) => matches!(
                err.status(),
                Some(status) if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
            ),
            _ => false,
        }
    }
}
