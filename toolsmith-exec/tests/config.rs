use std::time::Duration;

use toolsmith_exec::{ExecConfig, ToolError};

fn message(err: ToolError) -> String {
    match err {
        ToolError::Configuration { message } => message,
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn defaults_are_valid() {
    let cfg = ExecConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.retry.max_retries, 3);
    assert_eq!(cfg.retry.base_delay, Duration::from_millis(1000));
    assert_eq!(cfg.timeout, Duration::from_secs(30));
    assert_eq!(cfg.rate_limit.max_tokens, 20);
    assert_eq!(cfg.tool_prefix, "api");
    assert!(!cfg.strict_responses);
    assert!(cfg.retry.retry_unclassified);
}

#[test]
fn out_of_range_values_name_the_field() {
    let mut cfg = ExecConfig::default();
    cfg.retry.base_delay = Duration::from_millis(50);
    assert!(message(cfg.validate().unwrap_err()).contains("retry delay"));

    let mut cfg = ExecConfig::default();
    cfg.timeout = Duration::from_secs(301);
    assert!(message(cfg.validate().unwrap_err()).contains("timeout"));

    let mut cfg = ExecConfig::default();
    cfg.rate_limit.refill_per_second = 0.0;
    assert!(message(cfg.validate().unwrap_err()).contains("refill"));

    let mut cfg = ExecConfig::default();
    cfg.tool_prefix = "my-api".into();
    assert!(message(cfg.validate().unwrap_err()).contains("prefix"));
}

#[test]
fn range_bounds_are_inclusive() {
    let mut cfg = ExecConfig::default();
    cfg.retry.max_retries = 10;
    cfg.retry.base_delay = Duration::from_millis(100);
    cfg.timeout = Duration::from_millis(300_000);
    cfg.validate().unwrap();

    cfg.retry.max_retries = 0;
    cfg.retry.base_delay = Duration::from_millis(10_000);
    cfg.timeout = Duration::from_millis(1_000);
    cfg.validate().unwrap();
}
