use serde::Serialize;
use serde_json::Value;
use toolsmith_core::SearchQuery;
use toolsmith_exec::ToolDefinition;

use crate::cmd::offline_context;
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::{CatalogArgs, OutputArgs};

#[derive(Serialize)]
struct ToolSummary {
    name: String,
    description: String,
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    input_schema: Option<Value>,
}

#[derive(Serialize)]
struct ToolsResult {
    count: usize,
    tools: Vec<ToolSummary>,
}

pub fn tools_cmd(query: SearchQuery, schemas: bool, catalog: CatalogArgs, output: OutputArgs) -> i32 {
    let ctx = match offline_context(&catalog) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let definitions: Vec<ToolDefinition> = if query == SearchQuery::default() {
        ctx.list_tools()
    } else {
        ctx.catalog()
            .search(&query)
            .into_iter()
            .filter_map(|op| ctx.registry().get(&op.tool_name))
            .map(|tool| tool.definition.clone())
            .collect()
    };

    let tools: Vec<ToolSummary> = definitions
        .into_iter()
        .map(|d| ToolSummary {
            name: d.name,
            description: d.description,
            input_schema: schemas.then_some(d.input_schema),
        })
        .collect();
    print_result(
        output.format,
        output.quiet,
        &ToolsResult {
            count: tools.len(),
            tools,
        },
    );
    exit_codes::SUCCESS
}

pub fn describe_cmd(name: &str, catalog: CatalogArgs, output: OutputArgs) -> i32 {
    let ctx = match offline_context(&catalog) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    match ctx.list_tools().into_iter().find(|t| t.name == name) {
        Some(definition) => {
            print_result(output.format, output.quiet, &definition);
            exit_codes::SUCCESS
        }
        None => {
            print_error(output.format, output.quiet, &format!("unknown tool '{name}'"));
            exit_codes::VALIDATION_FAILED
        }
    }
}
