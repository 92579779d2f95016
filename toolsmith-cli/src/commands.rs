use std::path::PathBuf;

use clap::Subcommand;
use toolsmith_core::HttpMethod;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tools, optionally filtered.
    Tools {
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        method: Option<HttpMethod>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Only operations that look paginated.
        #[arg(long)]
        paginated: bool,
        /// Case-insensitive text search over names and descriptions.
        #[arg(long = "query", value_name = "TEXT")]
        text: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// Include each tool's input schema.
        #[arg(long)]
        schemas: bool,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print one tool's definition.
    Describe {
        name: String,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Catalog statistics.
    Stats {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Load every spec, compile every tool and report files that failed to load.
    Check {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Call a tool with JSON arguments.
    Invoke {
        name: String,
        /// Arguments as a JSON object.
        #[arg(long, conflicts_with = "args_file")]
        args: Option<String>,
        /// Arguments from a JSON or YAML file.
        #[arg(long)]
        args_file: Option<PathBuf>,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        exec: ExecArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Send an arbitrary request through the rate limiter and retry policy.
    Request {
        method: HttpMethod,
        /// Path relative to the server, starting with '/'.
        path: String,
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
        #[arg(long = "header", value_name = "KEY=VALUE")]
        headers: Vec<String>,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        exec: ExecArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
