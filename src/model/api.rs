use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::model::session::{Session, SessionUser};

/// Error body returned by the platform on failed requests.
///
/// The auth and data planes use different field names, so all known ones are
/// collected and the first present wins.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Token grant response from the auth provider.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: SessionUser,
}

impl SessionResponse {
    /// Convert the wire response into a cached [`Session`], stamping it with the
    /// current time for freshness tracking.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user: self.user,
            expires_at: now + TimeDelta::seconds(self.expires_in),
            fetched_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    mod error_body_tests {
        use crate::model::api::ApiErrorBody;

        #[test]
        /// Expect the first populated field to win, with a generic fallback
        fn test_error_body_message_priority() {
            let auth_style: ApiErrorBody =
                serde_json::from_str(r#"{"error_description":"invalid grant"}"#).unwrap();
            let rest_style: ApiErrorBody =
                serde_json::from_str(r#"{"message":"permission denied"}"#).unwrap();
            let empty = ApiErrorBody::default();

            assert_eq!(auth_style.message(), "invalid grant");
            assert_eq!(rest_style.message(), "permission denied");
            assert_eq!(empty.message(), "unknown error");
        }
    }

    mod session_response_tests {
        use chrono::{TimeDelta, Utc};

        use crate::model::api::SessionResponse;

        #[test]
        /// Expect expires_in seconds to translate into an absolute expiry
        fn test_into_session_expiry() {
            let response: SessionResponse = serde_json::from_str(
                r#"{
                    "access_token": "access",
                    "token_type": "bearer",
                    "expires_in": 3600,
                    "refresh_token": "refresh",
                    "user": {
                        "id": "550e8400-e29b-41d4-a716-446655440000",
                        "email": "tech@oficina.app"
                    }
                }"#,
            )
            .unwrap();

            let now = Utc::now();
            let session = response.into_session(now);

            assert_eq!(session.expires_at, now + TimeDelta::seconds(3600));
            assert_eq!(session.fetched_at, now);
            assert_eq!(session.user.email, "tech@oficina.app");
        }
    }
}
