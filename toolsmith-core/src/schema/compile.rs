use regex::Regex;
use serde_json::{Map, Value};

use crate::schema::{
    AdditionalProperties, ArrayRules, Field, NumberRules, ObjectRules, StringFormat, StringRules,
    Validator,
};

const COMPOSITION_KEYS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Compiles a schema fragment. Never fails; unsupported shapes become `Any`.
pub fn compile(schema: &Value) -> Validator {
    let Some(obj) = schema.as_object() else {
        return Validator::Any;
    };
    // Refs should have been inlined at load time; whatever is left is a cycle.
    if obj.contains_key("$ref") {
        return Validator::Any;
    }

    let nullable = obj.get("nullable").and_then(|v| v.as_bool()).unwrap_or(false);
    let compiled = compile_composed(obj);
    if nullable && !compiled.is_any() {
        Validator::Nullable(Box::new(compiled))
    } else {
        compiled
    }
}

fn compile_composed(obj: &Map<String, Value>) -> Validator {
    let mut parts = Vec::new();

    if let Some(branches) = obj.get("allOf").and_then(|v| v.as_array()) {
        parts.extend(branches.iter().map(compile).filter(|v| !v.is_any()));
    }
    for key in ["anyOf", "oneOf"] {
        if let Some(branches) = obj.get(key).and_then(|v| v.as_array()) {
            let compiled: Vec<Validator> = branches.iter().map(compile).collect();
            // A permissive branch makes the whole union permissive.
            if !compiled.is_empty() && !compiled.iter().any(Validator::is_any) {
                parts.push(Validator::AnyOf(compiled));
            }
        }
    }

    let has_composition = COMPOSITION_KEYS.iter().any(|k| obj.contains_key(*k));
    if !has_composition {
        return compile_plain(obj);
    }

    let remainder = compile_plain(obj);
    if !remainder.is_any() {
        parts.insert(0, remainder);
    }
    match parts.len() {
        0 => Validator::Any,
        1 => parts.remove(0),
        _ => Validator::AllOf(parts),
    }
}

fn compile_plain(obj: &Map<String, Value>) -> Validator {
    if let Some(values) = obj.get("enum").and_then(|v| v.as_array()) {
        if !values.is_empty() {
            return Validator::Enum(values.clone());
        }
    }

    match obj.get("type") {
        Some(Value::String(t)) => compile_type(t, obj),
        Some(Value::Array(types)) => {
            let mut branches = Vec::new();
            let mut nullable = false;
            for t in types.iter().filter_map(|t| t.as_str()) {
                if t == "null" {
                    nullable = true;
                } else {
                    branches.push(compile_type(t, obj));
                }
            }
            let inner = match branches.len() {
                0 => Validator::Any,
                1 => branches.remove(0),
                _ if branches.iter().any(Validator::is_any) => Validator::Any,
                _ => Validator::AnyOf(branches),
            };
            if nullable && !inner.is_any() {
                Validator::Nullable(Box::new(inner))
            } else {
                inner
            }
        }
        _ if obj.contains_key("properties") => compile_object(obj),
        _ if obj.contains_key("items") => compile_array(obj),
        _ => Validator::Any,
    }
}

fn compile_type(t: &str, obj: &Map<String, Value>) -> Validator {
    match t {
        "string" => compile_string(obj),
        "number" => compile_number(obj, false),
        "integer" => compile_number(obj, true),
        "boolean" => Validator::Boolean,
        "array" => compile_array(obj),
        "object" => compile_object(obj),
        other => {
            tracing::debug!(schema_type = other, "unsupported schema type, accepting any value");
            Validator::Any
        }
    }
}

fn usize_field(obj: &Map<String, Value>, key: &str) -> Option<usize> {
    obj.get(key).and_then(|v| v.as_u64()).map(|n| n as usize)
}

fn compile_string(obj: &Map<String, Value>) -> Validator {
    let pattern = obj.get("pattern").and_then(|v| v.as_str()).and_then(|p| match Regex::new(p) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(pattern = p, error = %e, "dropping invalid pattern");
            None
        }
    });
    let format = match obj.get("format").and_then(|v| v.as_str()) {
        Some("email") => Some(StringFormat::Email),
        Some("uri") | Some("url") => Some(StringFormat::Uri),
        Some("uuid") => Some(StringFormat::Uuid),
        _ => None,
    };
    Validator::String(StringRules {
        min_length: usize_field(obj, "minLength"),
        max_length: usize_field(obj, "maxLength"),
        pattern,
        format,
    })
}

fn compile_number(obj: &Map<String, Value>, integer: bool) -> Validator {
    let minimum = obj.get("minimum").and_then(|v| v.as_f64());
    let maximum = obj.get("maximum").and_then(|v| v.as_f64());

    // OpenAPI 3.0 uses booleans, 3.1 uses numeric bounds.
    let (minimum, exclusive_minimum) = match obj.get("exclusiveMinimum") {
        Some(Value::Bool(true)) => (None, minimum),
        Some(v) if v.is_number() => (minimum, v.as_f64()),
        _ => (minimum, None),
    };
    let (maximum, exclusive_maximum) = match obj.get("exclusiveMaximum") {
        Some(Value::Bool(true)) => (None, maximum),
        Some(v) if v.is_number() => (maximum, v.as_f64()),
        _ => (maximum, None),
    };

    Validator::Number(NumberRules {
        integer,
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
    })
}

fn compile_array(obj: &Map<String, Value>) -> Validator {
    let items = obj.get("items").map(compile).unwrap_or(Validator::Any);
    Validator::Array(ArrayRules {
        items: Box::new(items),
        min_items: usize_field(obj, "minItems"),
        max_items: usize_field(obj, "maxItems"),
    })
}

fn compile_object(obj: &Map<String, Value>) -> Validator {
    let required: Vec<&str> = obj
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut fields: Vec<Field> = obj
        .get("properties")
        .and_then(|p| p.as_object())
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| Field {
                    name: name.clone(),
                    required: required.contains(&name.as_str()),
                    validator: compile(schema),
                })
                .collect()
        })
        .unwrap_or_default();

    // Required keys with no declared schema still have to be present.
    for name in &required {
        if !fields.iter().any(|f| f.name == *name) {
            fields.push(Field {
                name: name.to_string(),
                required: true,
                validator: Validator::Any,
            });
        }
    }

    let additional = match obj.get("additionalProperties") {
        Some(Value::Bool(false)) => AdditionalProperties::Deny,
        Some(v @ Value::Object(_)) => match compile(v) {
            Validator::Any => AdditionalProperties::Allow,
            other => AdditionalProperties::Validate(Box::new(other)),
        },
        _ => AdditionalProperties::Allow,
    };

    Validator::Object(ObjectRules { fields, additional })
}
