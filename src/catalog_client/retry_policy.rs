//! Retry policy for catalog requests.
//!
//! Implements exponential backoff with configurable parameters.

use super::CatalogError;
use std::time::Duration;

/// Retry policy implementing exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub initial_backoff: Duration,
    /// Cap for exponential growth.
    pub max_backoff: Duration,
    /// Multiplier applied to backoff after each retry.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Check if an error should be retried given the current retry count.
    pub fn should_retry(&self, error: &CatalogError, retry_count: u32) -> bool {
        error.is_retryable() && retry_count < self.max_retries
    }

    /// Backoff to wait before retry number `retry_count` (zero-based).
    ///
    /// `initial_backoff * multiplier^retry_count`, capped at `max_backoff`.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(retry_count as i32);
        let capped_ms = backoff_ms.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
            backoff_multiplier: 2.0,
        }
    }
}
