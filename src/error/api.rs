use thiserror::Error;

/// Errors produced by the platform API wrappers.
///
/// The low-level request helpers classify every failed call into one of these
/// variants so callers can tell transient transport problems apart from data
/// problems without inspecting response bodies themselves.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {endpoint} failed with status {status}: {message}")]
    RequestFailed {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("Request to {0} timed out")]
    Timeout(String),
    #[error("Expected exactly one row from {table} but none matched the filter")]
    RowNotFound { table: String },
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}
