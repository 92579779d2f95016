use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use toolsmith_exec::retry::{parse_rate_limit, parse_retry_after};

fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn parse_retry_after_delta_seconds() {
    let h = headers(&[("Retry-After", "5")]);
    assert_eq!(parse_retry_after(&h, SystemTime::now()), Some(Duration::from_secs(5)));
}

#[test]
fn parse_retry_after_http_date() {
    let now = SystemTime::now();
    let h = headers(&[("Retry-After", &httpdate::fmt_http_date(now + Duration::from_secs(10)))]);
    let delay = parse_retry_after(&h, now).unwrap();
    assert!(delay.as_secs() >= 9 && delay.as_secs() <= 11);
}

#[test]
fn parse_retry_after_case_insensitive() {
    let h = headers(&[("retry-after", "3")]);
    assert_eq!(parse_retry_after(&h, SystemTime::now()), Some(Duration::from_secs(3)));
}

#[test]
fn parse_retry_after_falls_back_to_ratelimit_reset() {
    let now = SystemTime::now();
    let delta = headers(&[("X-RateLimit-Reset", "7")]);
    assert_eq!(parse_retry_after(&delta, now), Some(Duration::from_secs(7)));

    let epoch = (now + Duration::from_secs(15))
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let absolute = headers(&[("x-ratelimit-reset", &epoch.to_string())]);
    let delay = parse_retry_after(&absolute, now).unwrap();
    assert!(delay.as_secs() >= 14 && delay.as_secs() <= 15);
}

#[test]
fn parse_retry_after_standard_header_takes_precedence() {
    let h = headers(&[("Retry-After", "2"), ("X-RateLimit-Reset", "10")]);
    assert_eq!(parse_retry_after(&h, SystemTime::now()), Some(Duration::from_secs(2)));
}

#[test]
fn parse_retry_after_returns_none_when_missing() {
    assert!(parse_retry_after(&BTreeMap::new(), SystemTime::now()).is_none());
    let garbage = headers(&[("Retry-After", "soon")]);
    assert!(parse_retry_after(&garbage, SystemTime::now()).is_none());
}

#[test]
fn rate_limit_headers() {
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let h = headers(&[
        ("X-RateLimit-Limit", "100"),
        ("X-RateLimit-Remaining", "42"),
        ("X-RateLimit-Reset", "1700000060"),
    ]);
    let info = parse_rate_limit(&h, now).unwrap();
    assert_eq!(info.limit, Some(100));
    assert_eq!(info.remaining, Some(42));
    assert_eq!(info.reset_at.unwrap().timestamp(), 1_700_000_060);

    assert!(parse_rate_limit(&headers(&[("content-type", "application/json")]), now).is_none());
}
