//! Session bootstrap and lifetime management.
//!
//! The [`SessionBootstrap`] controller acquires and maintains a valid
//! (Session, Profile, Tenant) triple for the lifetime of the application, tolerating
//! transient network failures. It is the only writer of the shared [`AuthStore`]:
//! views subscribe to the store and the [gate](crate::service::gate) decides what to
//! render, while every mutation funnels through here.
//!
//! Failure semantics are deliberately asymmetric: network and timeout errors never
//! clear a valid-looking session (a flaky connection must not log anyone out), while
//! authentication errors clear it immediately.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

use crate::api::{auth::Credentials, PlatformClient};
use crate::config::BootstrapConfig;
use crate::error::{api::ApiError, auth::AuthError, Error};
use crate::model::{
    event::{AuthEvent, AuthEventKind},
    profile::Profile,
    session::Session,
    tenant::Tenant,
};
use crate::service::events::AuthEventBus;
use crate::service::retry::RetryContext;
use crate::store::{AuthStore, PersistedAuth, SessionCache};

/// Sessions expiring within this margin are refreshed instead of trusted.
const REFRESH_MARGIN_SECS: i64 = 60;

const PROFILE_COLUMNS: &str = "auth_user_id,tenant_id,name,email,role,permissions,avatar_url";

/// Controller owning session acquisition, profile loading, liveness, and sign-out.
pub struct SessionBootstrap {
    api: PlatformClient,
    store: AuthStore,
    cache: Arc<dyn SessionCache>,
    config: BootstrapConfig,
    events: AuthEventBus,
    /// Bumped whenever the current session is superseded; in-flight fetches compare
    /// their epoch before writing so a sign-out always wins.
    epoch: AtomicU64,
    /// At-most-one-concurrent-handler guard for auth events.
    handler_busy: AtomicBool,
    last_validated: tokio::sync::Mutex<Option<Instant>>,
}

impl SessionBootstrap {
    /// Create the controller plus the receiving end of its auth event stream.
    ///
    /// The receiver is meant for [`spawn_event_pump`](crate::service::events::spawn_event_pump).
    pub fn new(
        api: PlatformClient,
        cache: Arc<dyn SessionCache>,
        config: BootstrapConfig,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<AuthEvent>) {
        let (events, receiver) = AuthEventBus::new();

        let controller = Arc::new(Self {
            api,
            store: AuthStore::new(),
            cache,
            config,
            events,
            epoch: AtomicU64::new(0),
            handler_busy: AtomicBool::new(false),
            last_validated: tokio::sync::Mutex::new(None),
        });

        (controller, receiver)
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Event handle for pushing provider events from outside the controller.
    pub fn events(&self) -> &AuthEventBus {
        &self.events
    }

    pub fn api(&self) -> &PlatformClient {
        &self.api
    }

    /// Establish the initial auth state.
    ///
    /// Resolves the persisted session hint against the provider, loads profile and
    /// tenant data on success, and always leaves the loading state within the
    /// configured bound: a watchdog forces loading-complete even if the underlying
    /// call stalls, in which case the late result is ignored for state updates.
    pub async fn initialize(&self) {
        let watchdog = {
            let store = self.store.clone();
            let bound = self.config.init_timeout();
            tokio::spawn(async move {
                tokio::time::sleep(bound).await;
                if store.snapshot().loading {
                    tracing::warn!(
                        "Session bootstrap exceeded {:?}, forcing loading-complete",
                        bound
                    );
                    store.complete_loading();
                }
            })
        };

        match timeout(self.config.init_timeout(), self.resolve_session()).await {
            Err(_) => {
                tracing::warn!("Session retrieval stalled, continuing unauthenticated");
            }
            Ok(Err(e)) if e.is_auth_error() => {
                tracing::info!("Persisted session rejected by the provider: {e}");
                self.cache.clear();
            }
            // Transient failure: keep the persisted hint so the next launch can try
            // again, but come up unauthenticated rather than blocking.
            Ok(Err(e)) => {
                tracing::warn!("Session retrieval failed: {e}");
            }
            Ok(Ok(None)) => {
                tracing::debug!("No existing session");
            }
            Ok(Ok(Some(session))) => {
                tracing::debug!(user = %session.user.email, "Session resolved, loading profile");
                self.store.set_session(session.clone());
                self.mark_validated().await;
                self.load_profile(&session).await;
            }
        }

        self.store.complete_loading();
        watchdog.abort();
    }

    /// Resolve the current session from the provider, using the persisted copy as a
    /// hint: near-expiry sessions are refreshed, others are validated server-side.
    async fn resolve_session(&self) -> Result<Option<Session>, Error> {
        let Some(persisted) = self.cache.load() else {
            return Ok(None);
        };

        let session = persisted.session;
        let now = Utc::now();

        if session.expires_within(now, TimeDelta::seconds(REFRESH_MARGIN_SECS)) {
            return match self.api.auth().refresh(&session.refresh_token).await {
                Ok(refreshed) => {
                    self.persist(&refreshed);
                    Ok(Some(refreshed))
                }
                Err(e) if e.is_auth_error() => {
                    self.cache.clear();
                    Ok(None)
                }
                Err(e) => Err(e),
            };
        }

        match self.api.auth().user(&session.access_token).await {
            Ok(user) if user.id == session.user.id => Ok(Some(session)),
            Ok(user) => {
                tracing::warn!(
                    "Persisted session belongs to {} but the provider reports {}",
                    session.user.id,
                    user.id
                );
                self.cache.clear();
                Ok(None)
            }
            // Rejected token: one refresh attempt before giving the session up.
            Err(e) if e.is_auth_error() => match self.api.auth().refresh(&session.refresh_token).await {
                Ok(refreshed) => {
                    self.persist(&refreshed);
                    Ok(Some(refreshed))
                }
                Err(_) => {
                    self.cache.clear();
                    Ok(None)
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Fetch profile and tenant data for `session` and publish the result.
    ///
    /// Retries with exponential backoff and bounded attempts; on exhaustion installs a
    /// degraded profile derived from session claims so consumers never observe a blank
    /// authenticated state. Auth rejections clear the session instead.
    pub async fn load_profile(&self, session: &Session) {
        let epoch = self.epoch.load(Ordering::SeqCst);

        let mut retry = RetryContext::new(self.config.retry.clone());
        let description = format!("profile load for {}", session.user.email);
        let result = retry
            .execute_with_retry(&description, || self.fetch_profile_bundle(session))
            .await;

        match result {
            Ok((profile, tenant)) => {
                if !self.epoch_current(epoch) {
                    tracing::debug!("Discarding profile fetched for a superseded session");
                    return;
                }

                self.store.set_profile(profile, tenant, false);
            }
            Err(e) if e.is_auth_error() => {
                tracing::warn!("Profile load rejected as unauthorized: {e}");
                self.clear_local_state();
            }
            Err(e) => {
                tracing::warn!(
                    "Profile load failed ({e}), falling back to session-derived data"
                );

                if !self.epoch_current(epoch) {
                    return;
                }

                self.store
                    .set_profile(Profile::derived_from_session(session), None, true);
            }
        }
    }

    async fn fetch_profile_bundle(
        &self,
        session: &Session,
    ) -> Result<(Profile, Option<Tenant>), Error> {
        let profile: Profile = timeout(
            self.config.attempt_timeout(),
            self.api
                .table("profiles")
                .bearer(&session.access_token)
                .select(PROFILE_COLUMNS)
                .eq("auth_user_id", session.user.id)
                .single(),
        )
        .await
        .map_err(|_| ApiError::Timeout("/rest/v1/profiles".to_string()))??;

        let tenant = match profile.tenant_id {
            None => None,
            Some(tenant_id) => {
                let fetch = self
                    .api
                    .table("tenants")
                    .bearer(&session.access_token)
                    .eq("id", tenant_id)
                    .single::<Tenant>();

                match timeout(self.config.tenant_timeout(), fetch).await {
                    Ok(Ok(tenant)) => Some(tenant),
                    // The profile alone is enough to render; tenant data can catch up
                    // on a later refresh.
                    Ok(Err(e)) => {
                        tracing::warn!("Tenant fetch failed, continuing without tenant data: {e}");
                        None
                    }
                    Err(_) => {
                        tracing::warn!("Tenant fetch timed out, continuing without tenant data");
                        None
                    }
                }
            }
        };

        Ok((profile, tenant))
    }

    /// Force a re-fetch of profile and tenant for the current session.
    pub async fn refresh(&self) {
        let Some(session) = self.store.snapshot().session else {
            tracing::debug!("Refresh requested without a session, ignoring");
            return;
        };

        self.load_profile(&session).await;
    }

    /// Re-fetch only tenant data, e.g. after company settings were edited elsewhere.
    pub async fn refresh_tenant(&self) -> Result<(), Error> {
        let snapshot = self.store.snapshot();
        let Some(session) = snapshot.session else {
            return Err(AuthError::NotAuthenticated.into());
        };
        let Some(tenant_id) = snapshot.profile.as_ref().and_then(|profile| profile.tenant_id)
        else {
            return Ok(());
        };

        let tenant = self
            .api
            .table("tenants")
            .bearer(&session.access_token)
            .eq("id", tenant_id)
            .single::<Tenant>()
            .await?;

        self.store.set_tenant(Some(tenant));

        Ok(())
    }

    /// Sign in with email and password.
    ///
    /// On success the resulting session flows through the normal event path, so the
    /// profile load obeys the same coalescing and retry rules as provider-pushed
    /// sign-ins.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<(), Error> {
        let session = self.api.auth().sign_in(credentials).await?;

        self.persist(&session);
        self.events.emit(AuthEvent::signed_in(session));

        Ok(())
    }

    /// Register a new account and establish its session.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<(), Error> {
        let session = self.api.auth().sign_up(credentials).await?;

        self.persist(&session);
        self.events.emit(AuthEvent::signed_in(session));

        Ok(())
    }

    /// Request a password recovery email.
    pub async fn reset_password(&self, email: &str) -> Result<(), Error> {
        self.api.auth().reset_password(email).await
    }

    /// Invalidate the session and clear all local state. Idempotent.
    ///
    /// Local state and persisted artifacts are cleared before the provider call
    /// returns, so gates observe the sign-out immediately; a provider-side failure
    /// only logs, it can't keep the user signed in locally.
    pub async fn sign_out(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let token = self
            .store
            .snapshot()
            .session
            .map(|session| session.access_token);

        self.store.clear();
        self.cache.clear();

        if let Some(token) = token {
            if let Err(e) = self.api.auth().sign_out(&token).await {
                tracing::warn!("Provider sign-out failed: {e}");
            }
        }
    }

    /// Process one provider event.
    ///
    /// `SIGNED_OUT` always wins, even over an in-flight profile fetch. Everything else
    /// runs under an at-most-one-concurrent-handler policy: an event arriving while
    /// another is being handled is skipped and logged, not queued.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        if event.kind == AuthEventKind::SignedOut {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            self.clear_local_state();
            return;
        }

        if self.handler_busy.swap(true, Ordering::SeqCst) {
            tracing::debug!(kind = %event.kind, "Auth event skipped, a handler is already running");
            return;
        }
        let _busy = BusyGuard(&self.handler_busy);

        match (event.kind, event.session) {
            (AuthEventKind::SignedIn, Some(session)) => {
                self.store.set_session(session.clone());
                self.mark_validated().await;
                self.load_profile(&session).await;
                self.store.complete_loading();
            }
            (AuthEventKind::TokenRefreshed, Some(session))
            | (AuthEventKind::UserUpdated, Some(session)) => {
                self.persist(&session);
                self.store.set_session(session);
            }
            (kind, None) => {
                tracing::debug!(%kind, "Auth event without session payload ignored");
            }
            // SignedOut is handled above.
            (AuthEventKind::SignedOut, Some(_)) => {}
        }
    }

    /// Verify the session is still valid server-side.
    ///
    /// Invalidation clears all state (after one refresh attempt); transient failures
    /// only log, optionally noting connectivity, and never sign the user out.
    pub(crate) async fn check_liveness(&self) {
        let Some(session) = self.store.snapshot().session else {
            return;
        };

        let result = timeout(
            self.config.attempt_timeout(),
            self.api.auth().user(&session.access_token),
        )
        .await;

        match result {
            Ok(Ok(user)) if user.id == session.user.id => {
                self.mark_validated().await;
            }
            Ok(Ok(user)) => {
                tracing::warn!(
                    "Session now reported for user {} instead of {}, clearing state",
                    user.id,
                    session.user.id
                );
                self.epoch.fetch_add(1, Ordering::SeqCst);
                self.clear_local_state();
            }
            Ok(Err(e)) if e.is_auth_error() => {
                match self.api.auth().refresh(&session.refresh_token).await {
                    Ok(refreshed) => {
                        tracing::debug!("Session refreshed after rejected liveness check");
                        self.persist(&refreshed);
                        self.store.set_session(refreshed);
                        self.mark_validated().await;
                    }
                    Err(_) => {
                        tracing::info!("Session invalidated server-side, clearing state");
                        self.epoch.fetch_add(1, Ordering::SeqCst);
                        self.clear_local_state();
                    }
                }
            }
            Ok(Err(e)) => {
                let online = self.api.health().probe().await;
                tracing::warn!(online, "Liveness check failed: {e}");
            }
            Err(_) => {
                tracing::warn!("Liveness check timed out");
            }
        }
    }

    /// Re-validate the session once after the application regains foreground
    /// visibility; skipped when a validation already happened within the configured
    /// window.
    pub async fn on_foreground(&self) {
        {
            let last = self.last_validated.lock().await;
            if let Some(at) = *last {
                if at.elapsed() < self.config.focus_recheck_window() {
                    tracing::trace!("Skipping foreground recheck, session validated recently");
                    return;
                }
            }
        }

        if self.store.snapshot().session.is_none() {
            return;
        }

        self.check_liveness().await;
    }

    /// Upload a new avatar for the signed-in profile, store it on the profile row,
    /// and mirror the URL into the snapshot.
    pub async fn update_avatar(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error> {
        let Some(session) = self.store.snapshot().session else {
            return Err(AuthError::NotAuthenticated.into());
        };

        let path = format!("{}", session.user.id);
        let url = self
            .api
            .storage()
            .upload(&session.access_token, "avatars", &path, bytes, content_type)
            .await?;

        self.api
            .table("profiles")
            .bearer(&session.access_token)
            .eq("auth_user_id", session.user.id)
            .update(&serde_json::json!({ "avatar_url": url }))
            .await?;

        self.store.update_avatar(&url);

        Ok(url)
    }

    fn clear_local_state(&self) {
        self.store.clear();
        self.cache.clear();
    }

    fn persist(&self, session: &Session) {
        self.cache.save(&PersistedAuth {
            session: session.clone(),
            saved_at: Utc::now(),
        });
    }

    fn epoch_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn mark_validated(&self) {
        let mut last = self.last_validated.lock().await;
        *last = Some(Instant::now());
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
