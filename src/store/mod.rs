//! Single-writer auth state store.
//!
//! The (Session, Profile, Tenant) triple lives behind a `tokio::sync::watch` channel:
//! the bootstrap controller is the only writer, every consumer subscribes for change
//! notifications and reads immutable snapshots. Each mutation replaces the snapshot in
//! one `send_modify`, so a transition is never partially visible.

pub mod cache;

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{profile::Profile, session::Session, snapshot::AuthSnapshot, tenant::Tenant};

pub use cache::{FileSessionCache, MemorySessionCache, PersistedAuth, SessionCache};

/// Shared handle to the auth snapshot.
///
/// Mutating methods are crate-private; only the bootstrap controller calls them.
#[derive(Clone, Debug)]
pub struct AuthStore {
    tx: Arc<watch::Sender<AuthSnapshot>>,
}

impl AuthStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::default());

        Self { tx: Arc::new(tx) }
    }

    /// Subscribe for change notifications; the receiver immediately sees the current
    /// snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    pub(crate) fn set_session(&self, session: Session) {
        self.tx.send_modify(|snapshot| {
            snapshot.session = Some(session);
            snapshot.last_update += 1;
        });
    }

    pub(crate) fn set_profile(&self, profile: Profile, tenant: Option<Tenant>, degraded: bool) {
        self.tx.send_modify(|snapshot| {
            snapshot.profile = Some(profile);
            snapshot.tenant = tenant;
            snapshot.degraded = degraded;
            snapshot.last_update += 1;
        });
    }

    pub(crate) fn set_tenant(&self, tenant: Option<Tenant>) {
        self.tx.send_modify(|snapshot| {
            snapshot.tenant = tenant;
            snapshot.last_update += 1;
        });
    }

    /// Mark the initial bootstrap as finished. Idempotent.
    pub(crate) fn complete_loading(&self) {
        self.tx.send_if_modified(|snapshot| {
            if !snapshot.loading {
                return false;
            }

            snapshot.loading = false;
            snapshot.last_update += 1;
            true
        });
    }

    /// Drop session, profile, and tenant in one transition. Idempotent: clearing an
    /// already-empty store leaves it untouched.
    pub(crate) fn clear(&self) {
        self.tx.send_if_modified(|snapshot| {
            let already_empty = snapshot.session.is_none()
                && snapshot.profile.is_none()
                && snapshot.tenant.is_none()
                && !snapshot.loading
                && !snapshot.degraded;
            if already_empty {
                return false;
            }

            snapshot.session = None;
            snapshot.profile = None;
            snapshot.tenant = None;
            snapshot.loading = false;
            snapshot.degraded = false;
            snapshot.last_update += 1;
            true
        });
    }

    pub(crate) fn update_avatar(&self, url: &str) {
        self.tx.send_modify(|snapshot| {
            if let Some(profile) = snapshot.profile.as_mut() {
                profile.avatar_url = Some(url.to_string());
                snapshot.last_update += 1;
            }
        });
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}
