//! Operations turned into callable tools: a public definition (name,
//! description, argument schema) paired with a handler.

mod compile;
mod request;
mod shape;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use toolsmith_core::ValidationIssue;

use crate::error::ToolError;
use crate::resilient::ResilientExecutor;
use crate::response::ResponseValidator;
use crate::retry::RateLimitInfo;

pub use compile::{OperationHandler, ToolCompiler};
pub use request::build_request;
pub use shape::{build_input_shape, describe, ArgBinding, ArgTarget, InputShape, BODY_ARG};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    pub status: u16,
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
    /// Response schema mismatches tolerated outside strict mode.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationIssue>,
}

impl ToolOutput {
    pub fn content(content: Value) -> Self {
        Self {
            status: 200,
            content,
            rate_limit: None,
            warnings: Vec::new(),
        }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

/// Shared execution machinery every generated handler calls through.
pub struct ToolRuntime {
    pub executor: ResilientExecutor,
    pub responses: ResponseValidator,
}

#[derive(Clone)]
pub struct GeneratedTool {
    pub definition: ToolDefinition,
    pub handler: Arc<dyn ToolHandler>,
}

impl GeneratedTool {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.handler.call(args).await
    }
}

/// Tools by name. Built once, then shared read-only.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, GeneratedTool>,
}

impl ToolRegistry {
    pub fn insert(&mut self, tool: GeneratedTool) {
        self.tools.insert(tool.definition.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&GeneratedTool> {
        self.tools.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|t| &t.definition)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
