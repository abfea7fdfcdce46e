use crate::model::{profile::Profile, session::Session, tenant::Tenant};

/// Process-wide view of the (Session, Profile, Tenant) triple.
///
/// There is exactly one writer (the bootstrap controller) and any number of readers.
/// Every transition replaces the whole snapshot atomically, so readers never observe a
/// partially-applied update. `last_update` is a monotonic counter bumped on every
/// mutation, letting dependent views detect freshness changes without relying on
/// object identity.
#[derive(Clone, Debug)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    pub tenant: Option<Tenant>,
    /// True until the initial bootstrap completes (successfully or not).
    pub loading: bool,
    /// True when the profile is a session-derived fallback rather than fetched data.
    pub degraded: bool,
    pub last_update: u64,
}

impl AuthSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.profile.is_some()
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            session: None,
            profile: None,
            tenant: None,
            loading: true,
            degraded: false,
            last_update: 0,
        }
    }
}
