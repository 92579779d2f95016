use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::schema::issue::{join_path, type_name};
use crate::schema::{
    AdditionalProperties, ArrayRules, NumberRules, ObjectRules, StringFormat, StringRules,
    ValidationIssue, ValidationResult, Validator,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid"));

impl Validator {
    pub fn validate(&self, value: &Value) -> ValidationResult {
        let mut issues = Vec::new();
        let parsed = self.check(value, "", &mut issues);
        if issues.is_empty() {
            ValidationResult::Valid(parsed)
        } else {
            ValidationResult::Invalid(issues)
        }
    }

    /// Validates `value` at `path`, pushing issues and returning the parsed value.
    fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) -> Value {
        match self {
            Validator::Any => value.clone(),
            Validator::Boolean => {
                if !value.is_boolean() {
                    issues.push(mismatch(path, self, value));
                }
                value.clone()
            }
            Validator::String(rules) => {
                check_string(rules, self, value, path, issues);
                value.clone()
            }
            Validator::Number(rules) => {
                check_number(rules, self, value, path, issues);
                value.clone()
            }
            Validator::Enum(allowed) => {
                if !allowed.contains(value) {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("Invalid enum value {value}"),
                        self.describe(),
                        value.to_string(),
                    ));
                }
                value.clone()
            }
            Validator::Nullable(inner) => {
                if value.is_null() {
                    Value::Null
                } else {
                    inner.check(value, path, issues)
                }
            }
            Validator::Array(rules) => check_array(rules, self, value, path, issues),
            Validator::Object(rules) => check_object(rules, self, value, path, issues),
            Validator::AllOf(branches) => {
                let mut merged = value.clone();
                for branch in branches {
                    let parsed = branch.check(value, path, issues);
                    if let (Value::Object(acc), Value::Object(extra)) = (&mut merged, parsed) {
                        acc.extend(extra);
                    }
                }
                merged
            }
            Validator::AnyOf(branches) => {
                let mut closest: Option<Vec<ValidationIssue>> = None;
                for branch in branches {
                    let mut branch_issues = Vec::new();
                    let parsed = branch.check(value, path, &mut branch_issues);
                    if branch_issues.is_empty() {
                        return parsed;
                    }
                    if closest.as_ref().map_or(true, |c| branch_issues.len() < c.len()) {
                        closest = Some(branch_issues);
                    }
                }
                // Report the nearest branch only when it got past the type check.
                match closest {
                    Some(branch_issues) if branch_issues.iter().any(|i| i.path != path) => {
                        issues.extend(branch_issues)
                    }
                    _ => issues.push(ValidationIssue::new(
                        path,
                        "Value does not match any allowed schema",
                        self.describe(),
                        type_name(value),
                    )),
                }
                value.clone()
            }
        }
    }
}

fn mismatch(path: &str, expected: &Validator, value: &Value) -> ValidationIssue {
    ValidationIssue::new(
        path,
        format!("Expected {}, received {}", expected.describe(), type_name(value)),
        expected.describe(),
        type_name(value),
    )
}

fn check_string(
    rules: &StringRules,
    v: &Validator,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(s) = value.as_str() else {
        issues.push(mismatch(path, v, value));
        return;
    };
    let len = s.chars().count();
    if let Some(min) = rules.min_length {
        if len < min {
            issues.push(ValidationIssue::new(
                path,
                format!("String must contain at least {min} character(s)"),
                v.describe(),
                format!("string of length {len}"),
            ));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            issues.push(ValidationIssue::new(
                path,
                format!("String must contain at most {max} character(s)"),
                v.describe(),
                format!("string of length {len}"),
            ));
        }
    }
    if let Some(re) = &rules.pattern {
        if !re.is_match(s) {
            issues.push(ValidationIssue::new(
                path,
                format!("String does not match pattern {}", re.as_str()),
                v.describe(),
                s,
            ));
        }
    }
    if let Some(format) = rules.format {
        let ok = match format {
            StringFormat::Email => EMAIL_RE.is_match(s),
            StringFormat::Uri => url::Url::parse(s).is_ok(),
            StringFormat::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        };
        if !ok {
            issues.push(ValidationIssue::new(
                path,
                format!("Invalid {}", format.as_str()),
                v.describe(),
                s,
            ));
        }
    }
}

fn check_number(
    rules: &NumberRules,
    v: &Validator,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(n) = value.as_f64() else {
        issues.push(mismatch(path, v, value));
        return;
    };
    if rules.integer && n.fract() != 0.0 {
        issues.push(mismatch(path, v, value));
        return;
    }
    let mut bound = |ok: bool, message: String| {
        if !ok {
            issues.push(ValidationIssue::new(path, message, v.describe(), n.to_string()));
        }
    };
    if let Some(min) = rules.minimum {
        bound(n >= min, format!("Number must be greater than or equal to {min}"));
    }
    if let Some(min) = rules.exclusive_minimum {
        bound(n > min, format!("Number must be greater than {min}"));
    }
    if let Some(max) = rules.maximum {
        bound(n <= max, format!("Number must be less than or equal to {max}"));
    }
    if let Some(max) = rules.exclusive_maximum {
        bound(n < max, format!("Number must be less than {max}"));
    }
}

fn check_array(
    rules: &ArrayRules,
    v: &Validator,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Value {
    let Some(items) = value.as_array() else {
        issues.push(mismatch(path, v, value));
        return value.clone();
    };
    if let Some(min) = rules.min_items {
        if items.len() < min {
            issues.push(ValidationIssue::new(
                path,
                format!("Array must contain at least {min} element(s)"),
                v.describe(),
                format!("array of length {}", items.len()),
            ));
        }
    }
    if let Some(max) = rules.max_items {
        if items.len() > max {
            issues.push(ValidationIssue::new(
                path,
                format!("Array must contain at most {max} element(s)"),
                v.describe(),
                format!("array of length {}", items.len()),
            ));
        }
    }
    Value::Array(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| rules.items.check(item, &join_path(path, &i.to_string()), issues))
            .collect(),
    )
}

fn check_object(
    rules: &ObjectRules,
    v: &Validator,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Value {
    let Some(obj) = value.as_object() else {
        issues.push(mismatch(path, v, value));
        return value.clone();
    };

    let mut out = Map::with_capacity(obj.len());
    for field in &rules.fields {
        let field_path = join_path(path, &field.name);
        match obj.get(&field.name) {
            Some(inner) => {
                out.insert(field.name.clone(), field.validator.check(inner, &field_path, issues));
            }
            None if field.required => issues.push(ValidationIssue::new(
                field_path,
                "Required",
                field.validator.describe(),
                "missing",
            )),
            None => {}
        }
    }

    for (key, inner) in obj {
        if rules.fields.iter().any(|f| &f.name == key) {
            continue;
        }
        match &rules.additional {
            AdditionalProperties::Allow => {
                out.insert(key.clone(), inner.clone());
            }
            AdditionalProperties::Deny => issues.push(ValidationIssue::new(
                join_path(path, key),
                format!("Unrecognized key '{key}'"),
                "no additional properties",
                type_name(inner),
            )),
            AdditionalProperties::Validate(extra) => {
                out.insert(key.clone(), extra.check(inner, &join_path(path, key), issues));
            }
        }
    }
    Value::Object(out)
}
