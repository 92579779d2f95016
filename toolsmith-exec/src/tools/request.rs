use serde_json::{Map, Value};
use toolsmith_core::{OperationDefinition, ParamLocation};

use crate::error::ToolError;
use crate::http::ApiRequest;
use crate::tools::shape::{ArgBinding, ArgTarget};

/// Turns validated arguments into a request for `op`.
pub fn build_request(
    op: &OperationDefinition,
    bindings: &[ArgBinding],
    args: &Value,
) -> Result<ApiRequest, ToolError> {
    let mut path = op.path.clone();
    let mut request = ApiRequest::new(op.method, String::new());
    request.server_url = op.server_url.clone();
    let mut fields = Map::new();

    for binding in bindings {
        let Some(value) = args.get(&binding.name).filter(|v| !v.is_null()) else {
            continue;
        };
        match binding.target {
            ArgTarget::Param(ParamLocation::Path) => {
                let placeholder = format!("{{{}}}", binding.name);
                path = path.replace(&placeholder, &urlencoding::encode(&stringify(value)));
            }
            ArgTarget::Param(ParamLocation::Query) => match value {
                Value::Array(items) => {
                    for item in items {
                        request.query.push((binding.name.clone(), stringify(item)));
                    }
                }
                other => request.query.push((binding.name.clone(), stringify(other))),
            },
            ArgTarget::Param(ParamLocation::Header) => {
                request.headers.insert(binding.name.clone(), stringify(value));
            }
            ArgTarget::BodyField => {
                fields.insert(binding.name.clone(), value.clone());
            }
            ArgTarget::WholeBody => request.body = Some(value.clone()),
        }
    }

    if let Some(start) = path.find('{') {
        let end = path[start..].find('}').map_or(path.len(), |e| start + e + 1);
        return Err(ToolError::configuration(format!(
            "missing value for path parameter {} in {}",
            &path[start..end],
            op.path
        )));
    }

    if !fields.is_empty() {
        request.body = Some(Value::Object(fields));
    } else if request.body.is_none() && op.request_body.as_ref().is_some_and(|b| b.required) {
        request.body = Some(Value::Object(Map::new()));
    }
    request.path = path;
    Ok(request)
}

fn stringify(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
