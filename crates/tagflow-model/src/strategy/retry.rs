use serde::{Deserialize, Serialize};

use super::JitterStrategy;

/// Retry budget and backoff curve for remote calls.
///
/// Attempts are 1-based: the first attempt carries no delay, attempt `n`
/// waits `first_ms * factor^(n-2)` capped at `max_ms` before running, with
/// jitter applied on top by the transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryStrategy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub jitter: JitterStrategy,
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            jitter: JitterStrategy::default(),
            first_ms: 500,
            max_ms: 30_000,
            factor: 2.0,
        }
    }
}

impl RetryStrategy {
    /// Base delay (before jitter) applied ahead of `attempt`.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        if attempt <= 1 {
            return 0;
        }
        let raw = self.first_ms as f64 * self.factor.powi(attempt as i32 - 2);
        raw.min(self.max_ms as f64) as u64
    }
}
