use std::path::PathBuf;
use std::time::Duration;

use crate::error::config::ConfigError;
use crate::service::retry::RetryConfig;

/// Connection settings for the hosted platform backend.
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    /// Optional path for the persisted session hint; memory-only when unset.
    pub session_cache_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: require_env("OFICINA_API_URL")?,
            api_key: require_env("OFICINA_API_KEY")?,
            session_cache_path: std::env::var("OFICINA_SESSION_CACHE")
                .ok()
                .map(PathBuf::from),
        })
    }
}

fn require_env(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: "value is empty".to_string(),
        }),
        Err(_) => Err(ConfigError::MissingEnvVar(var.to_string())),
    }
}

/// Timing knobs for the bootstrap controller.
///
/// All timeouts and intervals are injected here rather than read from environment
/// flags inside the logic; embedders with slow networks raise the values, tests
/// shrink them.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    /// Upper bound on how long `initialize` may hold the loading state (milliseconds).
    pub init_timeout_ms: u64,
    /// Time box for a single profile-fetch or liveness attempt (milliseconds).
    pub attempt_timeout_ms: u64,
    /// Time box for the tenant fetch piggybacking on a profile load (milliseconds).
    pub tenant_timeout_ms: u64,
    /// How often the liveness heartbeat verifies the session (milliseconds).
    pub heartbeat_interval_ms: u64,
    /// Window within which a foreground recheck is skipped as redundant (milliseconds).
    pub focus_recheck_window_ms: u64,
    /// Coalescing window for bursts of auth events (milliseconds).
    pub event_debounce_ms: u64,
    /// Retry policy for profile loads.
    pub retry: RetryConfig,
}

impl BootstrapConfig {
    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn tenant_timeout(&self) -> Duration {
        Duration::from_millis(self.tenant_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn focus_recheck_window(&self) -> Duration {
        Duration::from_millis(self.focus_recheck_window_ms)
    }

    pub fn event_debounce(&self) -> Duration {
        Duration::from_millis(self.event_debounce_ms)
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 8_000,
            attempt_timeout_ms: 15_000,
            tenant_timeout_ms: 5_000,
            heartbeat_interval_ms: 30_000,
            focus_recheck_window_ms: 10_000,
            event_debounce_ms: 100,
            retry: RetryConfig::default(),
        }
    }
}
