mod builtin;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use toolsmith_core::{OperationCatalog, SpecStore};
use tracing::Instrument;

use crate::config::ExecConfig;
use crate::error::{ErrorPayload, ToolError};
use crate::http::ApiExecutor;
use crate::limiter::RateLimiter;
use crate::resilient::ResilientExecutor;
use crate::response::ResponseValidator;
use crate::tools::{ToolCompiler, ToolDefinition, ToolOutput, ToolRegistry, ToolRuntime};

pub use builtin::{BuiltinTool, LIST_OPERATIONS, RAW_REQUEST, REGISTRY_STATS};

/// What a caller gets back from [`ToolContext::invoke`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeResult {
    Content(Value),
    Error(ErrorPayload),
}

impl InvokeResult {
    pub fn is_error(&self) -> bool {
        matches!(self, InvokeResult::Error(_))
    }
}

/// Everything needed to list and call tools. Built explicitly; no globals.
pub struct ToolContext {
    config: ExecConfig,
    executor: Arc<dyn ApiExecutor>,
    catalog: Arc<OperationCatalog>,
    registry: Arc<ToolRegistry>,
    runtime: Arc<ToolRuntime>,
}

impl ToolContext {
    pub fn build(config: ExecConfig, executor: Arc<dyn ApiExecutor>) -> Result<Self, ToolError> {
        config.validate()?;
        let (catalog, registry, runtime) = assemble(&config, Arc::clone(&executor))?;
        Ok(Self {
            config,
            executor,
            catalog,
            registry,
            runtime,
        })
    }

    /// Reloads every spec and recompiles every tool from scratch.
    pub fn rebuild(&mut self) -> Result<(), ToolError> {
        let (catalog, registry, runtime) = assemble(&self.config, Arc::clone(&self.executor))?;
        self.catalog = catalog;
        self.registry = registry;
        self.runtime = runtime;
        Ok(())
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn runtime(&self) -> &ToolRuntime {
        &self.runtime
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<ToolDefinition> = self.registry.definitions().cloned().collect();
        tools.extend(BuiltinTool::ALL.iter().map(|b| b.definition(&self.config.tool_prefix)));
        tools
    }

    pub async fn invoke(&self, name: &str, args: Value) -> InvokeResult {
        let invocation_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("invoke", tool = %name, invocation_id = %invocation_id);
        async {
            match self.call(name, args).await {
                Ok(output) => {
                    tracing::info!(status = output.status, "tool call succeeded");
                    InvokeResult::Content(serde_json::to_value(&output).unwrap_or(Value::Null))
                }
                Err(err) => {
                    tracing::warn!(kind = ?err.kind(), error = %err, "tool call failed");
                    let mut payload = err.to_payload();
                    payload.tool.get_or_insert_with(|| name.to_string());
                    InvokeResult::Error(payload)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Like [`ToolContext::invoke`] but keeps the typed error.
    pub async fn call(&self, name: &str, args: Value) -> Result<ToolOutput, ToolError> {
        if let Some(builtin) = BuiltinTool::parse(&self.config.tool_prefix, name) {
            return builtin.call(self, args).await;
        }
        match self.registry.get(name) {
            Some(tool) => tool.call(args).await,
            None => Err(ToolError::configuration(format!("unknown tool '{name}'"))),
        }
    }
}

fn assemble(
    config: &ExecConfig,
    executor: Arc<dyn ApiExecutor>,
) -> Result<(Arc<OperationCatalog>, Arc<ToolRegistry>, Arc<ToolRuntime>), ToolError> {
    let mut catalog =
        OperationCatalog::with_prefix(SpecStore::new(&config.spec_dir), config.tool_prefix.clone());
    catalog
        .load()
        .map_err(|e| ToolError::configuration(e.to_string()))?;

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_tokens,
        config.rate_limit.refill_per_second,
    ));
    let runtime = Arc::new(ToolRuntime {
        executor: ResilientExecutor::new(executor, limiter, config.retry.clone(), config.timeout),
        responses: ResponseValidator::new(config.strict_responses),
    });
    let registry = ToolCompiler::new(Arc::clone(&runtime)).compile_catalog(&catalog);
    Ok((Arc::new(catalog), Arc::new(registry), runtime))
}
