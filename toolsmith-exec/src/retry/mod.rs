mod backoff;
mod config;
mod headers;

pub use backoff::{backoff_delay, with_retry, Retryable};
pub use config::RetryConfig;
pub use headers::{parse_rate_limit, parse_retry_after, RateLimitInfo};
