use std::collections::BTreeMap;

use serde_json::Value;

use crate::catalog::model::{
    HttpMethod, OperationDefinition, ParamLocation, ParameterDef, RequestBodyDef, ResponseDef,
};
use crate::catalog::naming::{default_operation_id, tool_name};
use crate::catalog::pagination::is_paginated;
use crate::spec::LoadedDocument;

/// Turns every `(path, verb)` pair of a dereferenced document into an operation.
pub(crate) fn extract_operations(doc: &LoadedDocument, prefix: &str) -> Vec<OperationDefinition> {
    let mut out = Vec::new();
    let Some(paths) = doc.document.get("paths").and_then(|v| v.as_object()) else {
        return out;
    };
    let doc_server = servers_first_url(&doc.document);

    for (path, item) in paths {
        let Some(item_obj) = item.as_object() else {
            continue;
        };
        let shared_params = item_obj.get("parameters").map(extract_params).unwrap_or_default();
        let item_server = servers_first_url(item);

        for method in HttpMethod::ALL {
            let Some(op) = item_obj.get(method.path_item_key()) else {
                continue;
            };
            if !op.is_object() {
                continue;
            }

            let operation_id = op
                .get("operationId")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| default_operation_id(method, path));

            let mut params = shared_params.clone();
            if let Some(p) = op.get("parameters") {
                params.extend(extract_params(p));
            }
            let parameters = dedupe_params(params);
            let responses = extract_responses(op);
            let paginated = is_paginated(&parameters, &responses);

            out.push(OperationDefinition {
                tool_name: tool_name(prefix, &doc.product, &operation_id),
                operation_id,
                method,
                path: path.clone(),
                product: doc.product.clone(),
                version: doc.version.clone(),
                summary: str_field(op, "summary"),
                description: str_field(op, "description"),
                parameters,
                request_body: op.get("requestBody").and_then(extract_request_body),
                responses,
                tags: op
                    .get("tags")
                    .and_then(|t| t.as_array())
                    .map(|arr| arr.iter().filter_map(|t| t.as_str().map(String::from)).collect())
                    .unwrap_or_default(),
                paginated,
                deprecated: op.get("deprecated").and_then(|v| v.as_bool()).unwrap_or(false),
                server_url: servers_first_url(op)
                    .or_else(|| item_server.clone())
                    .or_else(|| doc_server.clone()),
                source: doc.path.clone(),
                extensions: op
                    .as_object()
                    .map(|o| {
                        o.iter()
                            .filter(|(k, _)| k.starts_with("x-"))
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect()
                    })
                    .unwrap_or_default(),
            });
        }
    }
    out
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|s| s.as_str()).map(|s| s.to_string())
}

fn servers_first_url(v: &Value) -> Option<String> {
    let servers = v.get("servers")?.as_array()?;
    let first = servers.first()?.as_object()?;
    first.get("url")?.as_str().map(|s| s.to_string())
}

fn extract_params(parameters: &Value) -> Vec<ParameterDef> {
    parameters
        .as_array()
        .map(|arr| arr.iter().filter_map(extract_parameter_obj).collect())
        .unwrap_or_default()
}

fn extract_parameter_obj(p: &Value) -> Option<ParameterDef> {
    let name = p.get("name").and_then(|v| v.as_str())?;
    // Cookie parameters and unresolved refs are dropped here.
    let location = p.get("in").and_then(|v| v.as_str()).and_then(ParamLocation::from_openapi)?;
    let mut required = p.get("required").and_then(|v| v.as_bool()).unwrap_or(false);
    if location == ParamLocation::Path {
        required = true;
    }

    let schema = p
        .get("schema")
        .cloned()
        .or_else(|| {
            p.get("content")
                .and_then(|c| c.as_object())
                .and_then(|c| c.values().next())
                .and_then(|media| media.get("schema").cloned())
        })
        .unwrap_or(Value::Null);

    let mut examples = Vec::new();
    if let Some(ex) = p.get("example") {
        examples.push(ex.clone());
    }
    if let Some(map) = p.get("examples").and_then(|e| e.as_object()) {
        examples.extend(map.values().filter_map(|e| e.get("value").cloned()));
    }

    Some(ParameterDef {
        name: name.to_string(),
        location,
        required,
        schema,
        description: str_field(p, "description"),
        examples,
    })
}

/// Operation-level parameters override path-item ones sharing `(location, name)`.
fn dedupe_params(params: Vec<ParameterDef>) -> Vec<ParameterDef> {
    let mut map: BTreeMap<(ParamLocation, String), ParameterDef> = BTreeMap::new();
    for p in params {
        map.insert((p.location, p.name.clone()), p);
    }
    // BTreeMap ordering gives path, query, header.
    map.into_values().collect()
}

fn extract_request_body(rb: &Value) -> Option<RequestBodyDef> {
    let rb = rb.as_object()?;
    Some(RequestBodyDef {
        required: rb.get("required").and_then(|v| v.as_bool()).unwrap_or(false),
        content: media_schemas(rb.get("content")),
    })
}

fn extract_responses(op: &Value) -> BTreeMap<String, ResponseDef> {
    let Some(responses) = op.get("responses").and_then(|r| r.as_object()) else {
        return BTreeMap::new();
    };
    responses
        .iter()
        .filter(|(_, r)| r.is_object())
        .map(|(status, r)| {
            (
                status.clone(),
                ResponseDef {
                    description: str_field(r, "description"),
                    content: media_schemas(r.get("content")),
                },
            )
        })
        .collect()
}

fn media_schemas(content: Option<&Value>) -> BTreeMap<String, Value> {
    content
        .and_then(|c| c.as_object())
        .map(|c| {
            c.iter()
                .map(|(ct, media)| (ct.clone(), media.get("schema").cloned().unwrap_or(Value::Null)))
                .collect()
        })
        .unwrap_or_default()
}
