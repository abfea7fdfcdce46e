use crate::error::{api::ApiError, Error};

/// Strategy for handling errors in a retry context
pub enum ErrorRetryStrategy {
    /// Retry with exponential backoff (transient network/server failures)
    Retry,
    /// Failed permanently (auth rejections, bad requests, data problems)
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::HttpError(reqwest_error) => {
                if let Some(status) = reqwest_error.status() {
                    match status {
                        // The platform is temporarily unavailable, backoff and retry later.
                        s if s.is_server_error() => ErrorRetryStrategy::Retry,

                        // 408/429 - the request can be replayed once the pressure clears.
                        s if s.as_u16() == 408 || s.as_u16() == 429 => ErrorRetryStrategy::Retry,

                        // Remaining client errors mean we're making invalid requests,
                        // which won't resolve with retry.
                        _ => ErrorRetryStrategy::Fail,
                    }
                } else {
                    // Network error or connection issue - should retry
                    ErrorRetryStrategy::Retry
                }
            }

            Self::ApiError(api_error) => match api_error {
                ApiError::Timeout(_) => ErrorRetryStrategy::Retry,
                ApiError::RequestFailed { status, .. } => match status {
                    s if (500..600).contains(s) => ErrorRetryStrategy::Retry,
                    408 | 429 => ErrorRetryStrategy::Retry,
                    _ => ErrorRetryStrategy::Fail,
                },
                // Missing rows and decode failures indicate data issues that
                // won't resolve with retry.
                ApiError::RowNotFound { .. } => ErrorRetryStrategy::Fail,
                ApiError::Decode { .. } => ErrorRetryStrategy::Fail,
            },

            // Auth errors - permanent failures, the session has to be re-established
            Self::AuthError(_) => ErrorRetryStrategy::Fail,

            // Configuration errors - permanent failures, won't resolve with retry
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,

            // Parse errors - permanent failures (bad data format)
            Self::ParseError(_) => ErrorRetryStrategy::Fail,

            // InternalError - permanent failures (bug within the SDK's code)
            Self::InternalError(_) => ErrorRetryStrategy::Fail,

            // Serialization errors - permanent failures (bad data format)
            Self::JsonError(_) => ErrorRetryStrategy::Fail,
        }
    }
}
