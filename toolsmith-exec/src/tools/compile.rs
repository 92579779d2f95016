use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use toolsmith_core::{compile, OperationCatalog, OperationDefinition, Validator};

use crate::error::ToolError;
use crate::response::ResponseCheck;
use crate::tools::request::build_request;
use crate::tools::shape::{build_input_shape, describe, ArgBinding};
use crate::tools::{GeneratedTool, ToolDefinition, ToolHandler, ToolOutput, ToolRegistry, ToolRuntime};

pub struct ToolCompiler {
    runtime: Arc<ToolRuntime>,
}

impl ToolCompiler {
    pub fn new(runtime: Arc<ToolRuntime>) -> Self {
        Self { runtime }
    }

    pub fn compile(&self, op: &OperationDefinition) -> GeneratedTool {
        let shape = build_input_shape(op);
        let input = compile(&shape.schema);
        GeneratedTool {
            definition: ToolDefinition {
                name: op.tool_name.clone(),
                description: describe(op),
                input_schema: shape.schema,
            },
            handler: Arc::new(OperationHandler {
                operation: Arc::new(op.clone()),
                input,
                bindings: shape.bindings,
                runtime: Arc::clone(&self.runtime),
            }),
        }
    }

    pub fn compile_catalog(&self, catalog: &OperationCatalog) -> ToolRegistry {
        let mut registry = ToolRegistry::default();
        for op in catalog.operations() {
            registry.insert(self.compile(op));
        }
        tracing::info!(tools = registry.len(), "compiled tools");
        registry
    }
}

/// Validate, build, execute, check: the handler behind every generated tool.
pub struct OperationHandler {
    operation: Arc<OperationDefinition>,
    input: Validator,
    bindings: Vec<ArgBinding>,
    runtime: Arc<ToolRuntime>,
}

impl OperationHandler {
    pub fn operation(&self) -> &OperationDefinition {
        &self.operation
    }
}

#[async_trait]
impl ToolHandler for OperationHandler {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let op = self.operation.as_ref();
        let args = if args.is_null() { Value::Object(Default::default()) } else { args };

        let args = self.input.validate(&args).into_result().map_err(|issues| {
            ToolError::validation(format!("invalid arguments for {}", op.tool_name), issues)
        })?;
        let request = build_request(op, &self.bindings, &args).map_err(|e| e.in_tool(&op.tool_name))?;

        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");
        let response = self.runtime.executor.execute(&request, &op.tool_name).await?;
        let rate_limit = self.runtime.executor.rate_limit(&response);

        let warnings = match self.runtime.responses.check(op, response.status, &response.body) {
            ResponseCheck::Failed(issues) if self.runtime.responses.is_strict() => {
                return Err(ToolError::Validation {
                    status: Some(response.status),
                    message: format!("response from {} does not match its declared schema", op.tool_name),
                    issues,
                });
            }
            ResponseCheck::Failed(issues) => issues,
            ResponseCheck::Passed | ResponseCheck::Skipped => Vec::new(),
        };

        Ok(ToolOutput {
            status: response.status,
            content: response.body,
            rate_limit,
            warnings,
        })
    }
}
