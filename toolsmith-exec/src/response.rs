use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;
use toolsmith_core::{compile, OperationDefinition, ValidationIssue, Validator};

/// Outcome of checking one response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseCheck {
    Passed,
    Failed(Vec<ValidationIssue>),
    /// No JSON schema declared for the status.
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResponseStats {
    pub checked: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Validates response bodies against the schema declared for their status.
/// Validators are compiled on first use and cached per (tool, response key).
#[derive(Debug, Default)]
pub struct ResponseValidator {
    strict: bool,
    cache: Mutex<HashMap<(String, String), Arc<Validator>>>,
    passed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl ResponseValidator {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            ..Default::default()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn check(&self, op: &OperationDefinition, status: u16, body: &Value) -> ResponseCheck {
        let Some((key, def)) = op.response_for(status) else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return ResponseCheck::Skipped;
        };
        let Some(schema) = def.json_schema() else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return ResponseCheck::Skipped;
        };

        let validator = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache
                .entry((op.tool_name.clone(), key.to_string()))
                .or_insert_with(|| Arc::new(compile(schema)))
                .clone()
        };

        let result = validator.validate(body);
        if result.is_valid() {
            self.passed.fetch_add(1, Ordering::Relaxed);
            ResponseCheck::Passed
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                tool = %op.tool_name,
                status,
                issues = result.issues().len(),
                "response does not match declared schema"
            );
            ResponseCheck::Failed(result.issues().to_vec())
        }
    }

    pub fn stats(&self) -> ResponseStats {
        let passed = self.passed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        ResponseStats {
            checked: passed + failed,
            passed,
            failed,
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    pub fn cached_validators(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
