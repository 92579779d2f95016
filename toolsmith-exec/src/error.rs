use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use serde_json::Value;
use toolsmith_core::ValidationIssue;

use crate::retry::parse_retry_after;

/// Transport-level failure codes the executor knows how to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    Timeout,
    ConnectionReset,
    ConnectionRefused,
    DnsLookup,
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureCode::Timeout => "timeout",
            FailureCode::ConnectionReset => "connection reset",
            FailureCode::ConnectionRefused => "connection refused",
            FailureCode::DnsLookup => "dns lookup failed",
        })
    }
}

/// What an [`crate::http::ApiExecutor`] reports when a call does not succeed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("upstream responded with HTTP {status}")]
    Status {
        status: u16,
        headers: BTreeMap<String, String>,
        body: Vec<u8>,
    },
    #[error("{code}: {message}")]
    Io { code: FailureCode, message: String },
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
    /// No status and no recognizable code.
    #[error("{message}")]
    Unclassified { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Configuration,
    RateLimit,
    Network,
    Validation,
    NotFound,
    Timeout,
    Api,
    ToolExecution,
    Unknown,
}

/// Every failure a caller can observe, normalized into one fixed set of kinds.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    #[error("authentication failed: {message}")]
    Authentication { status: Option<u16>, message: String },
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("rate limited: {message}")]
    RateLimit {
        retry_after: Option<u64>,
        message: String,
    },
    #[error("network error: {message}")]
    Network {
        code: Option<FailureCode>,
        message: String,
    },
    #[error("validation failed: {message}")]
    Validation {
        status: Option<u16>,
        message: String,
        issues: Vec<ValidationIssue>,
    },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("timed out: {message}")]
    Timeout { message: String },
    #[error("upstream API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: Box<ToolError>,
    },
    #[error("unknown error: {message}")]
    Unknown { message: String, retryable: bool },
}

impl ToolError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ToolError::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        ToolError::Validation {
            status: None,
            message: message.into(),
            issues,
        }
    }

    pub fn in_tool(self, tool: impl Into<String>) -> Self {
        ToolError::ToolExecution {
            tool: tool.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Authentication { .. } => ErrorKind::Authentication,
            ToolError::Configuration { .. } => ErrorKind::Configuration,
            ToolError::RateLimit { .. } => ErrorKind::RateLimit,
            ToolError::Network { .. } => ErrorKind::Network,
            ToolError::Validation { .. } => ErrorKind::Validation,
            ToolError::NotFound { .. } => ErrorKind::NotFound,
            ToolError::Timeout { .. } => ErrorKind::Timeout,
            ToolError::Api { .. } => ErrorKind::Api,
            ToolError::ToolExecution { .. } => ErrorKind::ToolExecution,
            ToolError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The one retry policy. The resilient executor consults nothing else.
    pub fn is_retryable(&self) -> bool {
        match self {
            ToolError::RateLimit { .. } | ToolError::Network { .. } | ToolError::Timeout { .. } => {
                true
            }
            ToolError::Api { status, .. } => (500..=504).contains(status),
            ToolError::Unknown { retryable, .. } => *retryable,
            ToolError::ToolExecution { source, .. } => source.is_retryable(),
            ToolError::Authentication { .. }
            | ToolError::Configuration { .. }
            | ToolError::Validation { .. }
            | ToolError::NotFound { .. } => false,
        }
    }

    /// Server-provided wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ToolError::RateLimit {
                retry_after: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            ToolError::ToolExecution { source, .. } => source.retry_after(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::Authentication { status, .. } | ToolError::Validation { status, .. } => *status,
            ToolError::Api { status, .. } => Some(*status),
            ToolError::NotFound { .. } => Some(404),
            ToolError::RateLimit { .. } => Some(429),
            ToolError::ToolExecution { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let (tool, inner) = match self {
            ToolError::ToolExecution { tool, source } => (Some(tool.clone()), source.as_ref()),
            other => (None, other),
        };
        ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
            status: self.status(),
            retry_after: match inner {
                ToolError::RateLimit { retry_after, .. } => *retry_after,
                _ => None,
            },
            issues: match inner {
                ToolError::Validation { issues, .. } => issues.clone(),
                _ => Vec::new(),
            },
            tool,
            retryable: self.is_retryable(),
        }
    }
}

/// Serializable shape of a [`ToolError`] handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub retryable: bool,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Operation or tool name, used to prefix messages.
    pub operation: Option<String>,
    /// Whether a failure with neither status nor code is worth retrying.
    pub retry_unclassified: bool,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            operation: None,
            retry_unclassified: true,
        }
    }
}

impl ErrorContext {
    pub fn for_operation(operation: impl Into<String>, retry_unclassified: bool) -> Self {
        Self {
            operation: Some(operation.into()),
            retry_unclassified,
        }
    }

    fn describe(&self, message: String) -> String {
        match &self.operation {
            Some(op) => format!("{op}: {message}"),
            None => message,
        }
    }
}

/// Maps a transport failure onto exactly one [`ToolError`] kind.
///
/// HTTP status wins over transport codes; a timeout code wins over generic
/// network codes.
pub fn normalize(err: &TransportError, ctx: &ErrorContext) -> ToolError {
    match err {
        TransportError::Status {
            status,
            headers,
            body,
        } => normalize_status(*status, headers, body, ctx),
        TransportError::Io {
            code: FailureCode::Timeout,
            message,
        } => ToolError::Timeout {
            message: ctx.describe(message.clone()),
        },
        TransportError::Io { code, message } => ToolError::Network {
            code: Some(*code),
            message: ctx.describe(format!("{code}: {message}")),
        },
        TransportError::InvalidRequest { message } => ToolError::Configuration {
            message: ctx.describe(message.clone()),
        },
        TransportError::Unclassified { message } => ToolError::Unknown {
            message: ctx.describe(message.clone()),
            retryable: ctx.retry_unclassified,
        },
    }
}

fn normalize_status(
    status: u16,
    headers: &BTreeMap<String, String>,
    body: &[u8],
    ctx: &ErrorContext,
) -> ToolError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let message = ctx.describe(upstream_message(status, parsed.as_ref(), body));

    match status {
        401 | 403 => ToolError::Authentication {
            status: Some(status),
            message,
        },
        404 => ToolError::NotFound { message },
        429 => ToolError::RateLimit {
            retry_after: parse_retry_after(headers, SystemTime::now()).map(|d| d.as_secs()),
            message,
        },
        400..=499 => {
            let mut issues = parsed.as_ref().map(upstream_issues).unwrap_or_default();
            if issues.is_empty() {
                issues.push(ValidationIssue::new("", message.clone(), "accepted request", format!("HTTP {status}")));
            }
            ToolError::Validation {
                status: Some(status),
                message,
                issues,
            }
        }
        500..=599 => ToolError::Api { status, message },
        _ => ToolError::Unknown {
            message: format!("{message} (unexpected HTTP {status})"),
            retryable: false,
        },
    }
}

fn upstream_message(status: u16, parsed: Option<&Value>, body: &[u8]) -> String {
    if let Some(v) = parsed {
        let candidates = [
            v.get("message"),
            v.get("error").and_then(|e| e.get("message")),
            v.get("error"),
            v.get("detail"),
            v.get("title"),
        ];
        if let Some(s) = candidates.into_iter().flatten().find_map(|c| c.as_str()) {
            return s.to_string();
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("HTTP {status}")
    } else {
        text.chars().take(500).collect()
    }
}

/// Field-level errors in the common `{"errors": [{"field": .., "message": ..}]}` shape.
fn upstream_issues(v: &Value) -> Vec<ValidationIssue> {
    let Some(errors) = v.get("errors").and_then(|e| e.as_array()) else {
        return Vec::new();
    };
    errors
        .iter()
        .filter_map(|e| {
            let message = e.get("message").and_then(|m| m.as_str())?;
            let path = e
                .get("field")
                .or_else(|| e.get("path"))
                .and_then(|p| p.as_str())
                .unwrap_or_default();
            Some(ValidationIssue::new(path, message, "accepted value", "rejected upstream"))
        })
        .collect()
}
