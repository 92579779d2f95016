//! Compiles JSON-schema fragments from description documents into validators.
//!
//! The compiler is total: anything it does not understand becomes
//! [`Validator::Any`], so a malformed schema never blocks startup.

mod compile;
mod issue;
mod validate;

use regex::Regex;

pub use compile::compile;
pub use issue::{type_name, ValidationIssue, ValidationResult};

#[derive(Debug, Clone)]
pub enum Validator {
    String(StringRules),
    Number(NumberRules),
    Boolean,
    Array(ArrayRules),
    Object(ObjectRules),
    /// Every branch must accept the value.
    AllOf(Vec<Validator>),
    /// At least one branch must accept the value. Also used for `oneOf`.
    AnyOf(Vec<Validator>),
    Enum(Vec<serde_json::Value>),
    Nullable(Box<Validator>),
    Any,
}

#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Uri,
    Uuid,
}

impl StringFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uri => "uri",
            StringFormat::Uuid => "uuid",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NumberRules {
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ArrayRules {
    pub items: Box<Validator>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ObjectRules {
    pub fields: Vec<Field>,
    pub additional: AdditionalProperties,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub required: bool,
    pub validator: Validator,
}

#[derive(Debug, Clone)]
pub enum AdditionalProperties {
    /// Unknown keys pass through untouched.
    Allow,
    Deny,
    Validate(Box<Validator>),
}

impl Validator {
    pub fn is_any(&self) -> bool {
        matches!(self, Validator::Any)
    }

    /// Short human-readable description used as the `expected` field of issues.
    pub fn describe(&self) -> String {
        match self {
            Validator::String(r) => match r.format {
                Some(f) => format!("string ({})", f.as_str()),
                None => "string".to_string(),
            },
            Validator::Number(r) if r.integer => "integer".to_string(),
            Validator::Number(_) => "number".to_string(),
            Validator::Boolean => "boolean".to_string(),
            Validator::Array(_) => "array".to_string(),
            Validator::Object(_) => "object".to_string(),
            Validator::AllOf(_) => "allOf".to_string(),
            Validator::AnyOf(branches) => branches
                .iter()
                .map(|b| b.describe())
                .collect::<Vec<_>>()
                .join(" | "),
            Validator::Enum(values) => format!(
                "one of [{}]",
                values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
            ),
            Validator::Nullable(inner) => format!("{} | null", inner.describe()),
            Validator::Any => "any".to_string(),
        }
    }
}
