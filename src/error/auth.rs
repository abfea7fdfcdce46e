use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No active session is present")]
    NotAuthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Session could not be refreshed and has been invalidated")]
    RefreshFailed,
    #[error("Session for user {0:?} was rejected by the auth provider")]
    SessionRejected(Uuid),
}
