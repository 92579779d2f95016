use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::ToolError;
use crate::retry::config::RetryConfig;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;

    /// Server-provided wait, overriding computed backoff.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl Retryable for ToolError {
    fn is_retryable(&self) -> bool {
        ToolError::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        ToolError::retry_after(self)
    }
}

/// `min(base * 2^attempt + jitter, max_delay)` with jitter uniform in `[0, 0.2 * exp)`.
///
/// `unit_rand` is a sample from `[0, 1)`; passing it in keeps this pure.
pub fn backoff_delay(cfg: &RetryConfig, attempt: u32, unit_rand: f64) -> Duration {
    let exp = cfg.base_delay.as_millis() as f64 * 2f64.powi(attempt.min(62) as i32);
    let jitter = unit_rand.clamp(0.0, 1.0) * 0.2 * exp;
    let cap = cfg.max_delay.as_millis() as f64;
    Duration::from_millis((exp + jitter).min(cap).max(0.0) as u64)
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or attempts
/// run out. The last error is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(cfg: &RetryConfig, mut op: F) -> Result<T, E>
where
    E: Retryable + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;
    loop {
        let err = match op().await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        if !err.is_retryable() || attempt >= cfg.max_retries {
            return Err(err);
        }

        let delay = match err.retry_after() {
            Some(hint) => hint.min(cfg.max_delay),
            None => backoff_delay(cfg, attempt, fastrand::f64()),
        };
        tracing::warn!(
            attempt = attempt + 1,
            max_attempts = cfg.attempts(),
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
