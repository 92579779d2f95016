#![forbid(unsafe_code)]

//! Execution side of toolsmith: compiles catalog operations into tools and
//! runs them through a rate-limited, retrying HTTP executor.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod limiter;
pub mod resilient;
pub mod response;
pub mod retry;
pub mod tools;

pub use crate::config::{ExecConfig, RateLimitConfig};
pub use crate::dispatch::{InvokeResult, ToolContext};
pub use crate::error::{normalize, ErrorContext, ErrorKind, ErrorPayload, FailureCode, ToolError, TransportError};
pub use crate::http::{ApiExecutor, ApiRequest, ApiResponse, ReqwestExecutor};
pub use crate::limiter::RateLimiter;
pub use crate::resilient::ResilientExecutor;
pub use crate::response::{ResponseCheck, ResponseStats, ResponseValidator};
pub use crate::retry::{with_retry, RateLimitInfo, RetryConfig, Retryable};
pub use crate::tools::{GeneratedTool, ToolCompiler, ToolDefinition, ToolHandler, ToolOutput, ToolRegistry};
