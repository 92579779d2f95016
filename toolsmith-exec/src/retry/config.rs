use std::time::Duration;

/// Ceiling for any single wait between attempts, including server hints.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; `max_retries + 1` attempts in total.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Retry failures that carry neither an HTTP status nor a transport code.
    pub retry_unclassified: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: MAX_RETRY_DELAY,
            retry_unclassified: true,
        }
    }
}

impl RetryConfig {
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
