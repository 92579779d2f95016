use serde_json::{json, Map, Value};
use toolsmith_core::{OperationDefinition, ParamLocation};

/// Name of the single argument carrying a non-object request body.
pub const BODY_ARG: &str = "body";

/// Where an argument ends up in the outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgTarget {
    Param(ParamLocation),
    BodyField,
    WholeBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgBinding {
    pub name: String,
    pub target: ArgTarget,
}

/// Flat argument schema for one operation plus the map back to request parts.
#[derive(Debug, Clone, PartialEq)]
pub struct InputShape {
    pub schema: Value,
    pub bindings: Vec<ArgBinding>,
}

pub fn build_input_shape(op: &OperationDefinition) -> InputShape {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();
    let mut bindings = Vec::new();

    for param in &op.parameters {
        let mut schema = match &param.schema {
            Value::Object(m) => Value::Object(m.clone()),
            _ => json!({}),
        };
        if let (Some(desc), Some(obj)) = (&param.description, schema.as_object_mut()) {
            obj.entry("description").or_insert_with(|| Value::String(desc.clone()));
        }
        properties.insert(param.name.clone(), schema);
        if param.required {
            required.push(param.name.clone());
        }
        bindings.push(ArgBinding {
            name: param.name.clone(),
            target: ArgTarget::Param(param.location),
        });
    }

    if let Some(body) = &op.request_body {
        let schema = body.json_schema().cloned().unwrap_or_else(|| json!({}));
        match schema.get("properties").and_then(Value::as_object) {
            Some(fields) => {
                let body_required: Vec<&str> = schema
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                for (name, field_schema) in fields {
                    if properties.contains_key(name) {
                        tracing::debug!(
                            tool = %op.tool_name,
                            field = %name,
                            "body field shadowed by a parameter of the same name"
                        );
                        continue;
                    }
                    properties.insert(name.clone(), field_schema.clone());
                    if body.required && body_required.contains(&name.as_str()) {
                        required.push(name.clone());
                    }
                    bindings.push(ArgBinding {
                        name: name.clone(),
                        target: ArgTarget::BodyField,
                    });
                }
            }
            None if properties.contains_key(BODY_ARG) => {
                tracing::debug!(tool = %op.tool_name, "request body shadowed by a parameter named 'body'");
            }
            None => {
                properties.insert(BODY_ARG.to_string(), schema);
                if body.required {
                    required.push(BODY_ARG.to_string());
                }
                bindings.push(ArgBinding {
                    name: BODY_ARG.to_string(),
                    target: ArgTarget::WholeBody,
                });
            }
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    InputShape {
        schema: Value::Object(schema),
        bindings,
    }
}

/// Summary, then description, then `METHOD path`.
pub fn describe(op: &OperationDefinition) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(s) = op.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(s.trim().to_string());
    }
    if let Some(d) = op.description.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(d.trim().to_string());
    }
    parts.push(format!("{} {}", op.method, op.path));
    let text = parts.join("\n\n");
    if op.deprecated {
        format!("[deprecated] {text}")
    } else {
        text
    }
}
