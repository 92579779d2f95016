use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::SpecError;
use crate::parser::{parse_document_str, DocumentFormat};

/// Fully dereferences `$ref`s in a document.
///
/// Local (`#/...`) and relative-file (`other.yaml#/...`) references are
/// supported. A reference that re-enters itself is left in place as a bare
/// `{"$ref": ...}` object and reported through `warnings`.
pub(crate) struct Dereferencer {
    documents: HashMap<PathBuf, Value>,
    resolved: HashMap<String, Value>,
    cycles: usize,
    pub(crate) warnings: Vec<String>,
}

impl Dereferencer {
    pub(crate) fn new(path: &Path, document: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(path.to_path_buf(), document);
        Self {
            documents,
            resolved: HashMap::new(),
            cycles: 0,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn dereference_root(&mut self, path: &Path) -> Result<Value, SpecError> {
        let root = self
            .documents
            .get(path)
            .cloned()
            .unwrap_or(Value::Null);
        let mut stack = Vec::new();
        self.walk(&root, path, &mut stack)
    }

    fn walk(&mut self, value: &Value, file: &Path, stack: &mut Vec<String>) -> Result<Value, SpecError> {
        match value {
            Value::Object(obj) => {
                if let Some(reference) = obj.get("$ref").and_then(|v| v.as_str()) {
                    return self.follow(reference, obj, file, stack);
                }
                let mut out = Map::with_capacity(obj.len());
                for (k, v) in obj {
                    out.insert(k.clone(), self.walk(v, file, stack)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.walk(v, file, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn follow(
        &mut self,
        reference: &str,
        obj: &Map<String, Value>,
        file: &Path,
        stack: &mut Vec<String>,
    ) -> Result<Value, SpecError> {
        let (target_file, pointer) = split_reference(reference, file);
        let key = format!("{}#{}", target_file.display(), pointer);

        if stack.contains(&key) {
            self.cycles += 1;
            self.warnings
                .push(format!("{}: cyclic $ref '{reference}' left unresolved", file.display()));
            return Ok(Value::Object(obj.clone()));
        }

        let resolved = match self.resolved.get(&key) {
            Some(v) => v.clone(),
            None => {
                let target = self.lookup(&target_file, &pointer, reference, file)?;
                let cycles_before = self.cycles;
                stack.push(key.clone());
                let resolved = self.walk(&target, &target_file, stack);
                stack.pop();
                let resolved = resolved?;
                // A value cut short by a cycle depends on the entry point; only
                // complete expansions are reusable.
                if self.cycles == cycles_before {
                    self.resolved.insert(key, resolved.clone());
                }
                resolved
            }
        };

        // Sibling keywords next to `$ref` (e.g. `description`) override the target.
        let siblings: Vec<(&String, &Value)> = obj.iter().filter(|(k, _)| k.as_str() != "$ref").collect();
        match resolved {
            Value::Object(mut target) if !siblings.is_empty() => {
                for (k, v) in siblings {
                    target.insert(k.clone(), self.walk(v, file, stack)?);
                }
                Ok(Value::Object(target))
            }
            other => Ok(other),
        }
    }

    fn lookup(
        &mut self,
        target_file: &Path,
        pointer: &str,
        reference: &str,
        from: &Path,
    ) -> Result<Value, SpecError> {
        if !self.documents.contains_key(target_file) {
            let doc = load_external(target_file, reference, from)?;
            self.documents.insert(target_file.to_path_buf(), doc);
        }
        self.documents
            .get(target_file)
            .and_then(|doc| doc.pointer(pointer))
            .cloned()
            .ok_or_else(|| SpecError::UnresolvedRef {
                path: from.to_path_buf(),
                reference: reference.to_string(),
            })
    }
}

fn load_external(target_file: &Path, reference: &str, from: &Path) -> Result<Value, SpecError> {
    let unresolved = || SpecError::UnresolvedRef {
        path: from.to_path_buf(),
        reference: reference.to_string(),
    };
    let body = std::fs::read_to_string(target_file).map_err(|_| unresolved())?;
    let format = DocumentFormat::from_extension(target_file.extension().and_then(|e| e.to_str()));
    parse_document_str(&body, format).map_err(|_| unresolved())
}

/// Splits `file#/pointer` into an absolute-ish file path and a JSON pointer.
fn split_reference(reference: &str, current: &Path) -> (PathBuf, String) {
    let (file_part, fragment) = match reference.split_once('#') {
        Some((f, p)) => (f, p),
        None => (reference, ""),
    };
    let target = if file_part.is_empty() {
        current.to_path_buf()
    } else {
        current
            .parent()
            .map(|dir| dir.join(file_part))
            .unwrap_or_else(|| PathBuf::from(file_part))
    };
    (target, fragment.to_string())
}
