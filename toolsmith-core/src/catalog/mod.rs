//! Normalized, indexed view over every operation found under a spec directory.

mod extract;
mod model;
mod naming;
mod pagination;
mod search;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::error::CatalogError;
use crate::spec::SpecStore;

pub use model::{
    HttpMethod, OperationDefinition, ParamLocation, ParameterDef, RequestBodyDef, ResponseDef,
};
pub use naming::{default_operation_id, normalize_product, tool_name, MAX_TOOL_NAME_LEN};
pub use pagination::is_paginated;
pub use search::{CatalogStats, SearchQuery};

pub const DEFAULT_TOOL_PREFIX: &str = "api";

/// A description document that was skipped during load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug)]
pub struct OperationCatalog {
    store: SpecStore,
    prefix: String,
    loaded: bool,
    operations: BTreeMap<String, OperationDefinition>,
    by_product: BTreeMap<String, BTreeSet<String>>,
    by_method: BTreeMap<HttpMethod, BTreeSet<String>>,
    load_errors: Vec<LoadFailure>,
    warnings: Vec<String>,
}

impl OperationCatalog {
    pub fn new(store: SpecStore) -> Self {
        Self::with_prefix(store, DEFAULT_TOOL_PREFIX)
    }

    pub fn with_prefix(store: SpecStore, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            loaded: false,
            operations: BTreeMap::new(),
            by_product: BTreeMap::new(),
            by_method: BTreeMap::new(),
            load_errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Discovers and parses every spec file. A second call is a no-op.
    ///
    /// A missing spec directory is fatal; individual files that fail to load are
    /// logged, recorded in [`Self::load_errors`], and skipped.
    pub fn load(&mut self) -> Result<usize, CatalogError> {
        if self.loaded {
            return Ok(self.operations.len());
        }

        let files = self.store.discover()?;
        tracing::info!(root = %self.store.root().display(), files = files.len(), "loading spec files");

        for path in files {
            let doc = match self.store.load(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping spec file");
                    self.load_errors.push(LoadFailure {
                        path: e.path().clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            for w in &doc.warnings {
                tracing::warn!(path = %doc.path.display(), "{w}");
            }
            self.warnings.extend(doc.warnings.iter().cloned());

            for op in extract::extract_operations(&doc, &self.prefix) {
                self.insert(op);
            }
        }

        self.loaded = true;
        tracing::info!(
            operations = self.operations.len(),
            failed_files = self.load_errors.len(),
            "operation catalog loaded"
        );
        Ok(self.operations.len())
    }

    /// Drops all state so the next [`Self::load`] rebuilds from disk.
    pub fn reset(&mut self) {
        self.loaded = false;
        self.operations.clear();
        self.by_product.clear();
        self.by_method.clear();
        self.load_errors.clear();
        self.warnings.clear();
    }

    /// Inserts an operation, replacing any entry with the same tool name.
    pub fn insert(&mut self, op: OperationDefinition) {
        let name = op.tool_name.clone();
        if let Some(previous) = self.operations.remove(&name) {
            // Truncated names can alias distinct operations; last writer wins.
            if previous.operation_id != op.operation_id || previous.source != op.source {
                let msg = format!(
                    "tool name '{name}' collision: '{}' ({}) replaced by '{}' ({})",
                    previous.operation_id,
                    previous.source.display(),
                    op.operation_id,
                    op.source.display()
                );
                tracing::warn!("{msg}");
                self.warnings.push(msg);
            }
            self.unindex(&previous);
        }
        self.by_product
            .entry(op.product.clone())
            .or_default()
            .insert(name.clone());
        self.by_method.entry(op.method).or_default().insert(name.clone());
        self.operations.insert(name, op);
    }

    fn unindex(&mut self, op: &OperationDefinition) {
        if let Some(set) = self.by_product.get_mut(&op.product) {
            set.remove(&op.tool_name);
            if set.is_empty() {
                self.by_product.remove(&op.product);
            }
        }
        if let Some(set) = self.by_method.get_mut(&op.method) {
            set.remove(&op.tool_name);
            if set.is_empty() {
                self.by_method.remove(&op.method);
            }
        }
    }

    pub fn get(&self, tool_name: &str) -> Option<&OperationDefinition> {
        self.operations.get(tool_name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.operations.values()
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.by_product.keys().map(String::as_str)
    }

    pub fn by_product(&self, product: &str) -> Vec<&OperationDefinition> {
        self.lookup(self.by_product.get(product))
    }

    pub fn by_method(&self, method: HttpMethod) -> Vec<&OperationDefinition> {
        self.lookup(self.by_method.get(&method))
    }

    fn lookup(&self, names: Option<&BTreeSet<String>>) -> Vec<&OperationDefinition> {
        names
            .map(|set| set.iter().filter_map(|n| self.operations.get(n)).collect())
            .unwrap_or_default()
    }

    pub fn search(&self, query: &SearchQuery) -> Vec<&OperationDefinition> {
        let candidates: Box<dyn Iterator<Item = &OperationDefinition> + '_> = match &query.product {
            Some(product) => {
                let names: Vec<&String> = self
                    .by_product
                    .iter()
                    .filter(|(p, _)| p.eq_ignore_ascii_case(product))
                    .flat_map(|(_, set)| set.iter())
                    .collect();
                Box::new(names.into_iter().filter_map(|n| self.operations.get(n)))
            }
            None => Box::new(self.operations.values()),
        };
        candidates
            .filter(|op| query.matches(op))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_operations(self.operations.values())
    }

    pub fn load_errors(&self) -> &[LoadFailure] {
        &self.load_errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
