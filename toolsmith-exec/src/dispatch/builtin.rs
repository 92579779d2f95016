use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};
use toolsmith_core::{compile, HttpMethod, SearchQuery};

use crate::dispatch::ToolContext;
use crate::error::ToolError;
use crate::http::ApiRequest;
use crate::tools::{ToolDefinition, ToolOutput};

pub const RAW_REQUEST: &str = "raw_request";
pub const LIST_OPERATIONS: &str = "list_operations";
pub const REGISTRY_STATS: &str = "registry_stats";

/// Utility tools listed next to the generated ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTool {
    RawRequest,
    ListOperations,
    RegistryStats,
}

#[derive(Debug, Deserialize)]
struct RawRequestArgs {
    method: HttpMethod,
    path: String,
    #[serde(default)]
    query: BTreeMap<String, Value>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    server_url: Option<String>,
}

impl BuiltinTool {
    pub const ALL: [BuiltinTool; 3] = [
        BuiltinTool::RawRequest,
        BuiltinTool::ListOperations,
        BuiltinTool::RegistryStats,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            BuiltinTool::RawRequest => RAW_REQUEST,
            BuiltinTool::ListOperations => LIST_OPERATIONS,
            BuiltinTool::RegistryStats => REGISTRY_STATS,
        }
    }

    pub fn name(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.suffix())
    }

    pub fn parse(prefix: &str, name: &str) -> Option<Self> {
        let suffix = name.strip_prefix(prefix)?.strip_prefix('_')?;
        Self::ALL.into_iter().find(|b| b.suffix() == suffix)
    }

    pub fn definition(&self, prefix: &str) -> ToolDefinition {
        let (description, input_schema) = match self {
            BuiltinTool::RawRequest => (
                "Send an arbitrary request through the rate limiter and retry policy.",
                json!({
                    "type": "object",
                    "required": ["method", "path"],
                    "properties": {
                        "method": { "type": "string", "enum": HttpMethod::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>() },
                        "path": { "type": "string", "description": "Path relative to the server, starting with '/'" },
                        "query": { "type": "object" },
                        "headers": { "type": "object", "additionalProperties": { "type": "string" } },
                        "body": {},
                        "server_url": { "type": "string", "format": "uri" }
                    }
                }),
            ),
            BuiltinTool::ListOperations => (
                "Search the loaded operations by product, method, tag, pagination or text.",
                json!({
                    "type": "object",
                    "properties": {
                        "product": { "type": "string" },
                        "method": { "type": "string" },
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "paginated": { "type": "boolean" },
                        "text": { "type": "string" },
                        "limit": { "type": "integer", "minimum": 1 }
                    }
                }),
            ),
            BuiltinTool::RegistryStats => (
                "Report catalog counts, load errors and response validation statistics.",
                json!({ "type": "object", "properties": {} }),
            ),
        };
        ToolDefinition {
            name: self.name(prefix),
            description: description.to_string(),
            input_schema,
        }
    }

    pub(crate) async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolOutput, ToolError> {
        let name = self.name(&ctx.config().tool_prefix);
        let mut args = if args.is_null() { json!({}) } else { args };
        if let Some(Value::String(method)) = args.get_mut("method") {
            *method = method.to_ascii_uppercase();
        }
        let args = compile(&self.definition(&ctx.config().tool_prefix).input_schema)
            .validate(&args)
            .into_result()
            .map_err(|issues| ToolError::validation(format!("invalid arguments for {name}"), issues))?;

        match self {
            BuiltinTool::RawRequest => {
                let raw: RawRequestArgs = serde_json::from_value(args)
                    .map_err(|e| ToolError::validation(format!("invalid arguments for {name}: {e}"), Vec::new()))?;
                if !raw.path.starts_with('/') {
                    return Err(ToolError::configuration("path must start with '/'"));
                }
                let mut request = ApiRequest::new(raw.method, raw.path);
                for (k, v) in raw.query {
                    let v = match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    request.query.push((k, v));
                }
                request.headers = raw.headers;
                request.body = raw.body;
                request.server_url = raw.server_url;

                let executor = &ctx.runtime().executor;
                let response = executor.execute(&request, &name).await?;
                Ok(ToolOutput {
                    status: response.status,
                    rate_limit: executor.rate_limit(&response),
                    content: response.body,
                    warnings: Vec::new(),
                })
            }
            BuiltinTool::ListOperations => {
                let query: SearchQuery = serde_json::from_value(args)
                    .map_err(|e| ToolError::validation(format!("invalid arguments for {name}: {e}"), Vec::new()))?;
                let operations: Vec<Value> = ctx
                    .catalog()
                    .search(&query)
                    .into_iter()
                    .map(|op| {
                        json!({
                            "name": op.tool_name,
                            "method": op.method,
                            "path": op.path,
                            "product": op.product,
                            "version": op.version,
                            "summary": op.summary,
                            "tags": op.tags,
                            "paginated": op.paginated,
                            "deprecated": op.deprecated,
                        })
                    })
                    .collect();
                Ok(ToolOutput::content(json!({
                    "count": operations.len(),
                    "operations": operations,
                })))
            }
            BuiltinTool::RegistryStats => {
                let catalog = ctx.catalog();
                Ok(ToolOutput::content(json!({
                    "catalog": catalog.stats(),
                    "tools": ctx.registry().len(),
                    "load_errors": catalog.load_errors(),
                    "warnings": catalog.warnings(),
                    "responses": ctx.runtime().responses.stats(),
                    "rate_limit_tokens": ctx.runtime().executor.limiter().available(),
                })))
            }
        }
    }
}
