//! Retry logic with exponential backoff for platform operations.
//!
//! This module provides the `RetryContext` for executing operations with automatic
//! retry and exponential backoff. It exposes the attempt counter and last error so
//! callers can surface progress ("retrying, attempt 2 of 3"), and integrates with the
//! error system to determine which errors are retryable.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::{retry::ErrorRetryStrategy, Error};
use crate::util::clock::{Clock, TokioClock};

/// Tuning for [`RetryContext`].
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds)
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay (milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay on each further attempt
    pub backoff_factor: f64,
    /// Upper bound of the random jitter added to each delay (milliseconds)
    pub jitter_ms: u64,
}

impl RetryConfig {
    /// Pure backoff-delay formula: `min(max_delay, initial_delay × factor^(attempt-1))`.
    ///
    /// `attempt` is the 1-indexed attempt that just failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let raw = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent);
        let capped = (raw as u64).min(self.max_delay_ms);

        Duration::from_millis(capped)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            backoff_factor: 2.0,
            jitter_ms: 250,
        }
    }
}

/// Observable progress of a retry context.
#[derive(Clone, Debug, Default)]
pub struct RetryState {
    /// 1-indexed attempt currently running, 0 when idle
    pub current_attempt: u32,
    /// True while an attempt beyond the first is running
    pub is_retrying: bool,
    pub last_error: Option<String>,
    pub has_exceeded_max_attempts: bool,
}

type AttemptHook = Box<dyn Fn(u32, &Error) + Send + Sync>;

/// Context for executing operations with automatic retry logic.
///
/// Runs the provided async operation up to `max_attempts` times, sleeping between
/// attempts according to the backoff formula plus jitter. Errors are evaluated with
/// [`Error::to_retry_strategy`]: only transient errors are retried, permanent
/// failures return immediately. Sleeps go through the injected [`Clock`] so the whole
/// state machine can be driven without real timers.
pub struct RetryContext {
    config: RetryConfig,
    state: RetryState,
    clock: Arc<dyn Clock>,
    on_retry: Option<AttemptHook>,
    on_max_attempts_reached: Option<AttemptHook>,
}

impl RetryContext {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            state: RetryState::default(),
            clock: Arc::new(TokioClock),
            on_retry: None,
            on_max_attempts_reached: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Hook invoked synchronously with the attempt number after each failed attempt
    /// that will be retried.
    pub fn on_retry(mut self, hook: impl Fn(u32, &Error) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Box::new(hook));
        self
    }

    /// Hook invoked synchronously when the attempt budget is exhausted.
    pub fn on_max_attempts_reached(
        mut self,
        hook: impl Fn(u32, &Error) + Send + Sync + 'static,
    ) -> Self {
        self.on_max_attempts_reached = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &RetryState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = RetryState::default();
    }

    /// Executes an operation with automatic retry and exponential backoff.
    ///
    /// The operation is invoked at most `max_attempts` times. Transient failures sleep
    /// `min(max_delay, initial_delay × factor^(attempt-1))` plus jitter and try again;
    /// permanent failures and an exhausted budget reject with the last error.
    ///
    /// # Arguments
    /// - `description` - Human-readable description for logging (e.g., "profile load")
    /// - `operation` - Closure producing a fresh future per attempt
    pub async fn execute_with_retry<R, F, Fut>(
        &mut self,
        description: &str,
        mut operation: F,
    ) -> Result<R, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.state.current_attempt = attempt;
            self.state.is_retrying = attempt > 1;
            self.state.has_exceeded_max_attempts = false;

            tracing::debug!(
                "Processing {} (attempt {}/{})",
                description,
                attempt,
                self.config.max_attempts
            );

            match operation().await {
                Ok(result) => {
                    tracing::debug!("Successfully processed {}", description);
                    self.reset();
                    return Ok(result);
                }
                Err(e) => {
                    self.state.last_error = Some(e.to_string());
                    self.state.is_retrying = false;

                    match e.to_retry_strategy() {
                        ErrorRetryStrategy::Fail => {
                            tracing::error!("Permanent error for {}: {:?}", description, e);
                            return Err(e);
                        }
                        ErrorRetryStrategy::Retry => {
                            if attempt >= self.config.max_attempts {
                                self.state.has_exceeded_max_attempts = true;
                                if let Some(hook) = &self.on_max_attempts_reached {
                                    hook(attempt, &e);
                                }

                                tracing::error!(
                                    "Max attempts ({}) exceeded for {}: {:?}",
                                    self.config.max_attempts,
                                    description,
                                    e
                                );
                                return Err(e);
                            }

                            if let Some(hook) = &self.on_retry {
                                hook(attempt, &e);
                            }

                            let backoff = self.config.delay_for(attempt) + self.jitter();

                            tracing::warn!(
                                "Retrying {} (attempt {}/{}) after {:?}: {:?}",
                                description,
                                attempt,
                                self.config.max_attempts,
                                backoff,
                                e
                            );

                            self.clock.sleep(backoff).await;
                        }
                    }
                }
            }
        }
    }

    /// Resets internal counters and runs the operation fresh.
    ///
    /// Used for user-initiated "try again" actions after the budget was exhausted.
    pub async fn manual_retry<R, F, Fut>(
        &mut self,
        description: &str,
        operation: F,
    ) -> Result<R, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        self.reset();
        self.execute_with_retry(description, operation).await
    }

    fn jitter(&self) -> Duration {
        if self.config.jitter_ms == 0 {
            return Duration::ZERO;
        }

        Duration::from_millis(rand::rng().random_range(0..=self.config.jitter_ms))
    }
}
