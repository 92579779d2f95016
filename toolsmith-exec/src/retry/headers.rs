use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use httpdate::parse_http_date;
use serde::Serialize;

// Values above this are read as unix timestamps rather than delta seconds.
const EPOCH_THRESHOLD: u64 = 1_000_000_000;

/// Wait hint from `Retry-After`, falling back to `X-RateLimit-Reset`.
pub fn parse_retry_after(headers: &BTreeMap<String, String>, now: SystemTime) -> Option<Duration> {
    // Standard header wins.
    if let Some(v) = get_header_ci(headers, "retry-after") {
        if let Some(d) = parse_retry_after_value(v, now) {
            return Some(d);
        }
    }
    let reset = get_header_ci(headers, "x-ratelimit-reset")?;
    parse_reset(reset, now)?.duration_since(now).ok()
}

fn parse_retry_after_value(v: &str, now: SystemTime) -> Option<Duration> {
    let v = v.trim();
    if let Ok(secs) = v.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    // HTTP-date
    let dt = parse_http_date(v).ok()?;
    Some(dt.duration_since(now).unwrap_or_default())
}

fn parse_reset(v: &str, now: SystemTime) -> Option<SystemTime> {
    let n = v.trim().parse::<u64>().ok()?;
    if n >= EPOCH_THRESHOLD {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(n))
    } else {
        Some(now + Duration::from_secs(n))
    }
}

/// Rate-limit state advertised by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// Reads the `X-RateLimit-*` family. `None` when none of them are present.
pub fn parse_rate_limit(headers: &BTreeMap<String, String>, now: SystemTime) -> Option<RateLimitInfo> {
    let number = |name: &str| get_header_ci(headers, name).and_then(|v| v.trim().parse::<u64>().ok());
    let info = RateLimitInfo {
        limit: number("x-ratelimit-limit"),
        remaining: number("x-ratelimit-remaining"),
        reset_at: get_header_ci(headers, "x-ratelimit-reset")
            .and_then(|v| parse_reset(v, now))
            .map(DateTime::<Utc>::from),
    };
    if info.limit.is_none() && info.remaining.is_none() && info.reset_at.is_none() {
        return None;
    }
    Some(info)
}

fn get_header_ci<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
