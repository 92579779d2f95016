use std::path::PathBuf;
use std::time::Duration;

use toolsmith_core::catalog::DEFAULT_TOOL_PREFIX;

use crate::error::ToolError;
use crate::limiter::{DEFAULT_MAX_TOKENS, DEFAULT_REFILL_PER_SECOND};
use crate::retry::RetryConfig;

pub const DEFAULT_SPEC_DIR: &str = "specs";

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub max_tokens: u32,
    pub refill_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            refill_per_second: DEFAULT_REFILL_PER_SECOND,
        }
    }
}

/// Runtime settings for catalog loading and execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecConfig {
    pub spec_dir: PathBuf,
    pub tool_prefix: String,
    pub retry: RetryConfig,
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub rate_limit: RateLimitConfig,
    /// Fail calls whose response body does not match the declared schema.
    pub strict_responses: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            spec_dir: PathBuf::from(DEFAULT_SPEC_DIR),
            tool_prefix: DEFAULT_TOOL_PREFIX.to_string(),
            retry: RetryConfig::default(),
            timeout: Duration::from_millis(30_000),
            rate_limit: RateLimitConfig::default(),
            strict_responses: false,
        }
    }
}

impl ExecConfig {
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.retry.max_retries > 10 {
            return Err(ToolError::configuration(format!(
                "max_retries must be between 0 and 10 (got {})",
                self.retry.max_retries
            )));
        }
        let delay = self.retry.base_delay.as_millis();
        if !(100..=10_000).contains(&delay) {
            return Err(ToolError::configuration(format!(
                "retry delay must be between 100 and 10000 ms (got {delay})"
            )));
        }
        let timeout = self.timeout.as_millis();
        if !(1_000..=300_000).contains(&timeout) {
            return Err(ToolError::configuration(format!(
                "timeout must be between 1000 and 300000 ms (got {timeout})"
            )));
        }
        if self.rate_limit.max_tokens == 0 {
            return Err(ToolError::configuration("rate limit bucket must hold at least one token"));
        }
        if !(self.rate_limit.refill_per_second > 0.0 && self.rate_limit.refill_per_second.is_finite()) {
            return Err(ToolError::configuration("rate limit refill rate must be positive"));
        }
        if self.tool_prefix.is_empty()
            || !self.tool_prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ToolError::configuration(format!(
                "tool prefix '{}' must be non-empty and contain only [A-Za-z0-9_]",
                self.tool_prefix
            )));
        }
        Ok(())
    }
}
