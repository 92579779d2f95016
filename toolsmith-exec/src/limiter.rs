use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_MAX_TOKENS: u32 = 20;
pub const DEFAULT_REFILL_PER_SECOND: f64 = 2.0;

/// Token bucket shared by every outgoing request.
///
/// Tokens refill continuously. A caller that finds the bucket empty reserves
/// the next token anyway (the balance goes negative) and sleeps until it has
/// been earned, so concurrent waiters queue up instead of racing.
#[derive(Debug)]
pub struct RateLimiter {
    max_tokens: f64,
    refill_per_second: f64,
    state: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS, DEFAULT_REFILL_PER_SECOND)
    }
}

impl RateLimiter {
    pub fn new(max_tokens: u32, refill_per_second: f64) -> Self {
        let max_tokens = f64::from(max_tokens.max(1));
        Self {
            max_tokens,
            refill_per_second: refill_per_second.max(f64::EPSILON),
            state: Mutex::new(Bucket {
                tokens: max_tokens,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available, then consumes it.
    pub async fn acquire(&self) {
        if let Some(wait) = self.reserve() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limiter engaged");
            tokio::time::sleep(wait).await;
        }
    }

    /// Tokens currently in the bucket; negative while callers are queued.
    pub fn available(&self) -> f64 {
        let mut bucket = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket);
        bucket.tokens
    }

    fn reserve(&self) -> Option<Duration> {
        let mut bucket = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket);
        let before = bucket.tokens;
        bucket.tokens -= 1.0;
        if before >= 1.0 {
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - before) / self.refill_per_second))
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_second).min(self.max_tokens);
        bucket.last_refill = now;
    }
}
