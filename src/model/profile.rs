use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::session::Session;

/// Permission every profile is guaranteed to hold, including degraded ones.
pub const DEFAULT_PERMISSION: &str = "dashboard";

/// Access role of a profile, ordered by privilege level.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Attendant,
    Technician,
    Cashier,
    Finance,
    Manager,
    Admin,
}

impl Role {
    /// Numeric privilege level used by gate checks; higher levels imply broader access.
    pub fn level(self) -> u8 {
        match self {
            Self::Attendant => 1,
            Self::Technician => 2,
            Self::Cashier => 3,
            Self::Finance => 4,
            Self::Manager => 5,
            Self::Admin => 6,
        }
    }

    pub fn satisfies(self, required_level: u8) -> bool {
        self.level() >= required_level
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attendant => "attendant",
            Self::Technician => "technician",
            Self::Cashier => "cashier",
            Self::Finance => "finance",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Attendant
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level user record linking an authenticated identity to a tenant.
///
/// Exactly one profile exists per authenticated identity. `tenant_id` is `None` only
/// for accounts that signed up but have not been linked to a company yet.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Profile {
    pub auth_user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Profile {
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|permission| permission == name)
    }

    /// Minimal profile derived from session claims alone.
    ///
    /// Installed when the profile row cannot be fetched after all retry attempts, so
    /// consumers always observe a non-empty profile for an authenticated session. Uses
    /// only data the session itself carries; never fabricates identifiers.
    pub fn derived_from_session(session: &Session) -> Self {
        Self {
            auth_user_id: session.user.id,
            tenant_id: session.user.user_metadata.tenant_id,
            name: session.derived_display_name(),
            email: session.user.email.clone(),
            role: Role::default(),
            permissions: vec![DEFAULT_PERMISSION.to_string()],
            avatar_url: None,
        }
    }
}
