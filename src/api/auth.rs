//! Auth-plane endpoints: token grants, identity validation, sign-out, recovery.

use chrono::Utc;

use crate::api::{check_response, decode_json, PlatformClient};
use crate::error::{auth::AuthError, Error};
use crate::model::{
    api::SessionResponse,
    session::{Session, SessionUser},
};
use crate::util::form::FormState;

/// Email/password pair for the password grant.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Read credentials out of collected form state.
    pub fn from_form(form: &FormState) -> Result<Self, Error> {
        let email = form
            .field("email")
            .ok_or_else(|| Error::ParseError("sign-in form is missing the email field".to_string()))?;
        let password = form.field("password").ok_or_else(|| {
            Error::ParseError("sign-in form is missing the password field".to_string())
        })?;

        Ok(Self::new(email, password))
    }
}

pub struct AuthApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// Exchange email/password for a session (password grant).
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, Error> {
        let endpoint = "/auth/v1/token";
        let url = self.client.endpoint(endpoint);

        let response = self
            .client
            .http()
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", self.client.api_key())
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        // The provider answers rejected credentials with a 4xx on the token endpoint;
        // surface that as an auth error instead of a generic request failure.
        if response.status().is_client_error() {
            return Err(AuthError::InvalidCredentials.into());
        }

        let response = check_response(endpoint, response).await?;
        let grant: SessionResponse = decode_json(endpoint, response).await?;

        Ok(grant.into_session(Utc::now()))
    }

    /// Register a new account, returning its initial session.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Session, Error> {
        let endpoint = "/auth/v1/signup";
        let url = self.client.endpoint(endpoint);

        let response = self
            .client
            .http()
            .post(&url)
            .header("apikey", self.client.api_key())
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        let response = check_response(endpoint, response).await?;
        let grant: SessionResponse = decode_json(endpoint, response).await?;

        Ok(grant.into_session(Utc::now()))
    }

    /// Trade a refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, Error> {
        let endpoint = "/auth/v1/token";
        let url = self.client.endpoint(endpoint);

        let response = self
            .client
            .http()
            .post(&url)
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", self.client.api_key())
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        // A rejected refresh token means the session is gone for good.
        if response.status().is_client_error() {
            return Err(AuthError::RefreshFailed.into());
        }

        let response = check_response(endpoint, response).await?;
        let grant: SessionResponse = decode_json(endpoint, response).await?;

        Ok(grant.into_session(Utc::now()))
    }

    /// Validate an access token server-side, returning the identity it belongs to.
    pub async fn user(&self, access_token: &str) -> Result<SessionUser, Error> {
        let endpoint = "/auth/v1/user";
        let url = self.client.endpoint(endpoint);

        let response = self
            .client
            .http()
            .get(&url)
            .header("apikey", self.client.api_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check_response(endpoint, response).await?;

        decode_json(endpoint, response).await
    }

    /// Invalidate the session with the provider.
    ///
    /// A provider that no longer knows the session answers 401/404; both count as a
    /// successful sign-out so the operation stays idempotent.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), Error> {
        let endpoint = "/auth/v1/logout";
        let url = self.client.endpoint(endpoint);

        let response = self
            .client
            .http()
            .post(&url)
            .header("apikey", self.client.api_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        check_response(endpoint, response).await?;

        Ok(())
    }

    /// Request a password recovery email.
    pub async fn reset_password(&self, email: &str) -> Result<(), Error> {
        let endpoint = "/auth/v1/recover";
        let url = self.client.endpoint(endpoint);

        let response = self
            .client
            .http()
            .post(&url)
            .header("apikey", self.client.api_key())
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        check_response(endpoint, response).await?;

        Ok(())
    }
}
