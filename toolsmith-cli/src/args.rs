use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use toolsmith_exec::config::DEFAULT_SPEC_DIR;
use toolsmith_exec::{ExecConfig, RateLimitConfig, RetryConfig};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    /// Root of the `<product>/<version>/openapi.*` tree.
    #[arg(long, env = "TOOLSMITH_SPEC_DIR", default_value = DEFAULT_SPEC_DIR)]
    pub spec_dir: PathBuf,
    #[arg(long, env = "TOOLSMITH_TOOL_PREFIX", default_value = "api")]
    pub prefix: String,
}

#[derive(Debug, Args, Clone)]
pub struct ExecArgs {
    /// Overrides the servers declared by the specs.
    #[arg(long, env = "TOOLSMITH_BASE_URL")]
    pub base_url: Option<url::Url>,
    /// Environment variable holding the bearer token.
    #[arg(long, default_value = "TOOLSMITH_TOKEN")]
    pub token_env: String,
    /// Per-attempt timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    pub retry_delay_ms: u64,
    /// Do not retry failures that carry neither a status nor a transport code.
    #[arg(long)]
    pub no_retry_unclassified: bool,
    /// Token bucket capacity.
    #[arg(long = "rate-limit", default_value_t = 20)]
    pub rate_limit_tokens: u32,
    /// Tokens added per second.
    #[arg(long = "refill-rate", default_value_t = 2.0)]
    pub rate_limit_refill: f64,
    /// Fail calls whose response does not match the declared schema.
    #[arg(long)]
    pub strict_responses: bool,
}

pub fn exec_config(catalog: &CatalogArgs, exec: &ExecArgs) -> ExecConfig {
    ExecConfig {
        spec_dir: catalog.spec_dir.clone(),
        tool_prefix: catalog.prefix.clone(),
        retry: RetryConfig {
            max_retries: exec.max_retries,
            base_delay: Duration::from_millis(exec.retry_delay_ms),
            retry_unclassified: !exec.no_retry_unclassified,
            ..RetryConfig::default()
        },
        timeout: Duration::from_millis(exec.timeout_ms),
        rate_limit: RateLimitConfig {
            max_tokens: exec.rate_limit_tokens,
            refill_per_second: exec.rate_limit_refill,
        },
        strict_responses: exec.strict_responses,
    }
}
