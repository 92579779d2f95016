use std::path::Path;

use secrecy::SecretString;
use serde_json::{json, Map, Value};
use toolsmith_core::{parse_document_str, DocumentFormat, HttpMethod};
use toolsmith_exec::dispatch::BuiltinTool;
use toolsmith_exec::{InvokeResult, ToolContext};

use crate::cmd::build_context;
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::{exec_config, CatalogArgs, ExecArgs, OutputArgs};

/// Raw request assembled from `request` flags.
pub struct RawRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<String>,
    pub headers: Vec<String>,
    pub body: Option<String>,
}

pub async fn invoke_cmd(
    name: &str,
    args: Option<&str>,
    args_file: Option<&Path>,
    catalog: CatalogArgs,
    exec: ExecArgs,
    output: OutputArgs,
) -> i32 {
    let arguments = match read_arguments(args, args_file) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::VALIDATION_FAILED;
        }
    };
    let ctx = match context(&catalog, &exec) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    run(&ctx, name, arguments, &output).await
}

pub async fn request_cmd(request: RawRequest, catalog: CatalogArgs, exec: ExecArgs, output: OutputArgs) -> i32 {
    let arguments = match raw_arguments(request) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::VALIDATION_FAILED;
        }
    };
    let ctx = match context(&catalog, &exec) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let name = BuiltinTool::RawRequest.name(&catalog.prefix);
    run(&ctx, &name, arguments, &output).await
}

fn context(catalog: &CatalogArgs, exec: &ExecArgs) -> Result<ToolContext, String> {
    let token = std::env::var(&exec.token_env).ok().map(SecretString::from);
    build_context(exec_config(catalog, exec), exec.base_url.clone(), token).map_err(|e| e.to_string())
}

async fn run(ctx: &ToolContext, name: &str, arguments: Value, output: &OutputArgs) -> i32 {
    let result = ctx.invoke(name, arguments).await;
    print_result(output.format, output.quiet, &result);
    match result {
        InvokeResult::Content(_) => exit_codes::SUCCESS,
        InvokeResult::Error(_) => exit_codes::CALL_FAILED,
    }
}

fn read_arguments(inline: Option<&str>, file: Option<&Path>) -> Result<Value, String> {
    let (text, format) = match (inline, file) {
        (Some(s), _) => (s.to_string(), DocumentFormat::Json),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            (text, DocumentFormat::from_extension(path.extension().and_then(|e| e.to_str())))
        }
        (None, None) => return Ok(Value::Object(Map::new())),
    };
    let value = parse_document_str(&text, format).map_err(|e| format!("invalid arguments: {e}"))?;
    if !value.is_object() {
        return Err("arguments must be a JSON object".to_string());
    }
    Ok(value)
}

fn raw_arguments(request: RawRequest) -> Result<Value, String> {
    let mut query = Map::new();
    for pair in &request.query {
        let (k, v) = split_pair(pair)?;
        query.insert(k, Value::String(v));
    }
    let mut headers = Map::new();
    for pair in &request.headers {
        let (k, v) = split_pair(pair)?;
        headers.insert(k, Value::String(v));
    }
    let mut args = json!({
        "method": request.method,
        "path": request.path,
        "query": query,
        "headers": headers,
    });
    if let Some(body) = request.body {
        let body: Value = serde_json::from_str(&body).map_err(|e| format!("invalid --body JSON: {e}"))?;
        args["body"] = body;
    }
    Ok(args)
}

fn split_pair(pair: &str) -> Result<(String, String), String> {
    pair.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))
}
