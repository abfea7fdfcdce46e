use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated identity claims as returned by the auth provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form metadata the provider attaches to the identity.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
}

/// Proof of authentication issued by the auth provider.
///
/// The provider owns the session; this is the SDK's cached copy with a freshness
/// timestamp. Only the bootstrap controller replaces or destroys it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
    /// When this copy of the session was obtained from the provider.
    pub fetched_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when the session expires within `margin` of `now`, meaning it should be
    /// refreshed rather than trusted for further requests.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        self.expires_at - now <= margin
    }

    /// Display name derived purely from session claims: the metadata full name when
    /// present, otherwise the local part of the email address.
    pub fn derived_display_name(&self) -> String {
        if let Some(full_name) = &self.user.user_metadata.full_name {
            if !full_name.trim().is_empty() {
                return full_name.clone();
            }
        }

        self.user
            .email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }
}
