use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use toolsmith_exec::retry::backoff_delay;
use toolsmith_exec::{with_retry, RetryConfig, ToolError};

fn cfg(max_retries: u32, base_ms: u64) -> RetryConfig {
    RetryConfig {
        max_retries,
        base_delay: Duration::from_millis(base_ms),
        ..RetryConfig::default()
    }
}

fn api(status: u16) -> ToolError {
    ToolError::Api {
        status,
        message: "upstream".into(),
    }
}

#[tokio::test(start_paused = true)]
async fn recovers_after_two_server_errors() {
    let calls = &AtomicU32::new(0);
    let start = Instant::now();

    let result = with_retry(&cfg(3, 1000), move || async move {
        match calls.fetch_add(1, Ordering::SeqCst) {
            0 | 1 => Err(api(503)),
            _ => Ok("done"),
        }
    })
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let elapsed = start.elapsed();
    // 1000 + 2000 plus at most 20% jitter on each.
    assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(3600), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn terminal_errors_are_not_retried() {
    let calls = &AtomicU32::new(0);
    let result: Result<(), ToolError> = with_retry(&cfg(3, 1000), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::NotFound {
            message: "gone".into(),
        })
    })
    .await;

    assert!(matches!(result, Err(ToolError::NotFound { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn exhaustion_returns_last_error_unchanged() {
    let calls = &AtomicU32::new(0);
    let result: Result<(), ToolError> = with_retry(&cfg(2, 100), move || async move {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::Api {
            status: 502,
            message: format!("attempt {n}"),
        })
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match result {
        Err(ToolError::Api { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "attempt 2");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn zero_retries_means_one_attempt() {
    let calls = &AtomicU32::new(0);
    let _: Result<(), ToolError> = with_retry(&cfg(0, 100), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(api(500))
    })
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_after_hint_overrides_backoff() {
    let calls = &AtomicU32::new(0);
    let start = Instant::now();
    let result = with_retry(&cfg(3, 100), move || async move {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ToolError::RateLimit {
                retry_after: Some(5),
                message: "slow down".into(),
            })
        } else {
            Ok(())
        }
    })
    .await;

    assert!(result.is_ok());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_millis(5100));
}

#[tokio::test(start_paused = true)]
async fn retry_after_hint_is_capped() {
    let calls = &AtomicU32::new(0);
    let start = Instant::now();
    let _ = with_retry(&cfg(1, 100), move || async move {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ToolError::RateLimit {
                retry_after: Some(3600),
                message: "come back later".into(),
            })
        } else {
            Ok(())
        }
    })
    .await;
    assert!(start.elapsed() <= Duration::from_secs(31));
}

#[test]
fn backoff_is_exponential_with_bounded_jitter() {
    let c = cfg(3, 1000);
    assert_eq!(backoff_delay(&c, 0, 0.0), Duration::from_millis(1000));
    assert_eq!(backoff_delay(&c, 1, 0.0), Duration::from_millis(2000));
    assert_eq!(backoff_delay(&c, 2, 0.0), Duration::from_millis(4000));
    assert_eq!(backoff_delay(&c, 1, 1.0), Duration::from_millis(2400));
    assert_eq!(backoff_delay(&c, 10, 0.5), Duration::from_secs(30));
}
