use std::sync::Arc;
use std::time::Duration;

use crate::error::{normalize, ErrorContext, FailureCode, ToolError, TransportError};
use crate::http::{ApiExecutor, ApiRequest, ApiResponse};
use crate::limiter::RateLimiter;
use crate::retry::{with_retry, RateLimitInfo, RetryConfig};

/// Wraps an [`ApiExecutor`] with the shared rate limiter, per-attempt timeout,
/// error normalization and retry.
pub struct ResilientExecutor {
    inner: Arc<dyn ApiExecutor>,
    limiter: Arc<RateLimiter>,
    retry: RetryConfig,
    timeout: Duration,
}

impl ResilientExecutor {
    pub fn new(
        inner: Arc<dyn ApiExecutor>,
        limiter: Arc<RateLimiter>,
        retry: RetryConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            inner,
            limiter,
            retry,
            timeout,
        }
    }

    /// Every attempt, retries included, takes a token first and is cut off
    /// after the configured timeout even if the inner executor ignores it.
    pub async fn execute(&self, request: &ApiRequest, operation: &str) -> Result<ApiResponse, ToolError> {
        let ctx = ErrorContext::for_operation(operation, self.retry.retry_unclassified);
        let ctx = &ctx;
        with_retry(&self.retry, move || async move {
            self.limiter.acquire().await;
            let attempt = self.inner.execute(request.clone(), self.timeout);
            let outcome = match tokio::time::timeout(self.timeout, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Io {
                    code: FailureCode::Timeout,
                    message: format!("no response within {}ms", self.timeout.as_millis()),
                }),
            };
            outcome.map_err(|e| normalize(&e, ctx))
        })
        .await
    }

    pub fn rate_limit(&self, response: &ApiResponse) -> Option<RateLimitInfo> {
        self.inner.rate_limit(response)
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }
}
