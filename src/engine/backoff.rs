//! Bounded retry with exponential backoff

use std::time::Duration;

use crate::config::types::ExecutionSettings;

/// Exponential backoff between retry attempts.
///
/// Formula: min(max_delay, base * 2^attempt)
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    max_delay: Duration,
    attempt: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10))
    }
}

impl ExponentialBackoff {
    /// Create a new ExponentialBackoff.
    ///
    /// # Arguments
    /// * `base` - Initial delay duration
    /// * `max_delay` - Maximum delay cap
    pub fn new(base: Duration, max_delay: Duration) -> Self {
        Self {
            base,
            max_delay,
            attempt: 0,
        }
    }

    /// Calculate the next delay and increment the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp_delay = self.base.saturating_mul(2u32.saturating_pow(self.attempt));
        self.attempt = self.attempt.saturating_add(1);
        exp_delay.min(self.max_delay)
    }

    /// Get current attempt number.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

/// How often and how patiently a retryable call is repeated
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Retries without waiting, for tests and dry runs against mocks
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn from_settings(settings: &ExecutionSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.backoff_base_ms),
            Duration::from_millis(settings.backoff_max_ms),
        )
    }

    /// Fresh backoff schedule for one retried operation
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.base_delay, self.max_delay)
    }
}
