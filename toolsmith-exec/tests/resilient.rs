use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use toolsmith_core::HttpMethod;
use toolsmith_exec::{
    ApiExecutor, ApiRequest, ApiResponse, RateLimiter, ReqwestExecutor, ResilientExecutor,
    RetryConfig, ToolError, TransportError,
};

/// Never answers and ignores the timeout it is handed.
#[derive(Default)]
struct Silent {
    attempts: AtomicU32,
}

#[async_trait]
impl ApiExecutor for Silent {
    async fn execute(&self, _request: ApiRequest, _timeout: Duration) -> Result<ApiResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

fn retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        base_delay: Duration::from_millis(100),
        ..RetryConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn attempts_are_bounded_by_the_timeout() {
    let inner = Arc::new(Silent::default());
    let executor = ResilientExecutor::new(
        inner.clone(),
        Arc::new(RateLimiter::default()),
        retry(2),
        Duration::from_millis(1000),
    );

    let result = tokio::time::timeout(
        Duration::from_secs(60),
        executor.execute(&ApiRequest::new(HttpMethod::Get, "/slow"), "api_slow"),
    )
    .await
    .expect("the resilient executor should give up on its own");

    let err = result.unwrap_err();
    assert!(matches!(err, ToolError::Timeout { .. }), "{err:?}");
    assert!(err.is_retryable());
    assert_eq!(inner.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn invalid_requests_are_not_retried() {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let inner = ReqwestExecutor::with_client(client, Url::parse("http://127.0.0.1:9").ok(), None);
    let limiter = Arc::new(RateLimiter::new(5, 1.0));
    let executor = ResilientExecutor::new(
        Arc::new(inner),
        limiter.clone(),
        retry(3),
        Duration::from_secs(1),
    );

    let mut request = ApiRequest::new(HttpMethod::Get, "/x");
    request.headers.insert("x-bad".into(), "a\nb".into());
    let err = executor.execute(&request, "api_bad").await.unwrap_err();

    assert!(matches!(err, ToolError::Configuration { .. }), "{err:?}");
    // One attempt means one token taken.
    assert!(limiter.available() > 3.5 && limiter.available() <= 4.5, "{}", limiter.available());
}
