//! Authorization gate for tenant-scoped views.
//!
//! A [`ProtectedGate`] wraps one mounted view: the host re-evaluates it on every
//! snapshot change and renders whatever the gate decides. While the bootstrap is
//! loading the gate always asks for a loading indicator, so a slow startup never
//! flashes a premature redirect. Redirects to sign-in are debounced and deduplicated
//! across gates through a shared [`RedirectGuard`], preventing redirect storms when
//! many gates mount at once.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::api::health::Connectivity;
use crate::model::{profile::Role, snapshot::AuthSnapshot};
use crate::util::clock::{Clock, TokioClock};

/// Debounce and duplicate-suppression windows for gate redirects.
#[derive(Clone, Debug)]
pub struct GateConfig {
    /// How long an unauthenticated gate waits before actually redirecting (milliseconds).
    pub redirect_debounce_ms: u64,
    /// Window within which a second redirect to the same target is suppressed (milliseconds).
    pub redirect_suppress_window_ms: u64,
}

impl GateConfig {
    pub fn redirect_debounce(&self) -> Duration {
        Duration::from_millis(self.redirect_debounce_ms)
    }

    pub fn redirect_suppress_window(&self) -> Duration {
        Duration::from_millis(self.redirect_suppress_window_ms)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            redirect_debounce_ms: 300,
            redirect_suppress_window_ms: 15_000,
        }
    }
}

/// Where a failed gate check sends the user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RedirectTarget {
    SignIn,
    AccessDenied,
}

/// What a gate wants its host view to do right now.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GateDecision {
    /// Render a transitional loading indicator; covers bootstrap loading, suspended
    /// offline decisions, pending debounce, and suppressed duplicate redirects.
    ShowLoading,
    RenderChildren,
    /// Navigate away; emitted at most once per target within the suppression window.
    Redirect(RedirectTarget),
}

/// Lifecycle of a single mounted gate.
///
/// `Authorized` and the redirecting states are terminal: nothing leaves them except a
/// fresh mount.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateState {
    Mounting,
    Loading,
    Authorized,
    Redirecting(RedirectTarget),
}

/// Access requirement for a protected view.
#[derive(Clone, Debug, Default)]
pub struct AccessRequirement {
    pub min_level: u8,
    pub permissions: Vec<String>,
}

impl AccessRequirement {
    pub fn level(min_level: u8) -> Self {
        Self {
            min_level,
            permissions: Vec::new(),
        }
    }

    pub fn role(role: Role) -> Self {
        Self::level(role.level())
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.push(permission.to_string());
        self
    }
}

/// Process-wide redirect marker shared by all gates.
///
/// Remembers the last navigation per target so simultaneous gate mounts produce a
/// single redirect; entries expire after the suppression window.
pub struct RedirectGuard {
    config: GateConfig,
    clock: Arc<dyn Clock>,
    last_redirect: Mutex<Option<(RedirectTarget, Instant)>>,
}

impl RedirectGuard {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            clock: Arc::new(TokioClock),
            last_redirect: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Clear the marker, e.g. alongside other local artifacts on sign-out.
    pub fn reset(&self) {
        if let Ok(mut last) = self.last_redirect.lock() {
            *last = None;
        }
    }

    /// True when a redirect to `target` should actually navigate; false when a recent
    /// redirect already covered it.
    fn try_redirect(&self, target: RedirectTarget) -> bool {
        let now = self.clock.now();
        let Ok(mut last) = self.last_redirect.lock() else {
            return true;
        };

        if let Some((recent_target, at)) = *last {
            if recent_target == target
                && now.duration_since(at) < self.config.redirect_suppress_window()
            {
                tracing::debug!(?target, "Suppressing duplicate redirect");
                return false;
            }
        }

        *last = Some((target, now));
        true
    }

    fn debounce(&self) -> Duration {
        self.config.redirect_debounce()
    }
}

/// Gate instance protecting one mounted view.
pub struct ProtectedGate {
    requirement: AccessRequirement,
    guard: Arc<RedirectGuard>,
    clock: Arc<dyn Clock>,
    state: GateState,
    pending_since: Option<Instant>,
}

impl ProtectedGate {
    pub fn new(requirement: AccessRequirement, guard: Arc<RedirectGuard>) -> Self {
        Self {
            requirement,
            guard,
            clock: Arc::new(TokioClock),
            state: GateState::Mounting,
            pending_since: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Evaluate the gate against the current snapshot.
    ///
    /// Hosts call this on mount, on every snapshot change, and on a timer tick while a
    /// redirect debounce is pending.
    pub fn evaluate(
        &mut self,
        snapshot: &AuthSnapshot,
        connectivity: Connectivity,
    ) -> GateDecision {
        match self.state {
            // Terminal states: no way back except a fresh mount.
            GateState::Redirecting(_) => return GateDecision::ShowLoading,
            GateState::Authorized => return GateDecision::RenderChildren,
            GateState::Mounting => self.state = GateState::Loading,
            GateState::Loading => {}
        }

        if snapshot.loading {
            return GateDecision::ShowLoading;
        }

        if !snapshot.is_authenticated() {
            // Without connectivity this might be a dropped network rather than a real
            // sign-out; hold the decision instead of bouncing the user.
            if connectivity == Connectivity::Offline {
                return GateDecision::ShowLoading;
            }

            return self.redirect_after_debounce(RedirectTarget::SignIn);
        }

        self.pending_since = None;

        let authorized = snapshot.profile.as_ref().is_some_and(|profile| {
            profile.role.satisfies(self.requirement.min_level)
                && self
                    .requirement
                    .permissions
                    .iter()
                    .all(|permission| profile.has_permission(permission))
        });

        if !authorized {
            self.state = GateState::Redirecting(RedirectTarget::AccessDenied);
            return if self.guard.try_redirect(RedirectTarget::AccessDenied) {
                GateDecision::Redirect(RedirectTarget::AccessDenied)
            } else {
                GateDecision::ShowLoading
            };
        }

        self.state = GateState::Authorized;
        GateDecision::RenderChildren
    }

    fn redirect_after_debounce(&mut self, target: RedirectTarget) -> GateDecision {
        let now = self.clock.now();

        match self.pending_since {
            None => {
                self.pending_since = Some(now);
                GateDecision::ShowLoading
            }
            Some(since) if now.duration_since(since) < self.guard.debounce() => {
                GateDecision::ShowLoading
            }
            Some(_) => {
                self.state = GateState::Redirecting(target);
                if self.guard.try_redirect(target) {
                    GateDecision::Redirect(target)
                } else {
                    GateDecision::ShowLoading
                }
            }
        }
    }
}
