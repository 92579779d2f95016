//! Discovery and loading of OpenAPI description documents from a directory tree.

mod discover;
mod refs;

use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use crate::error::{CatalogError, SpecError};
use crate::parser::{parse_document_str, DocumentFormat};

pub use discover::is_spec_file_name;

pub const DEFAULT_VERSION: &str = "v1";
pub const DEFAULT_PRODUCT: &str = "default";

/// A description document with every resolvable `$ref` inlined.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub product: String,
    pub version: String,
    pub document: Value,
    /// Non-fatal findings (e.g. cyclic references left in place).
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SpecStore {
    root: PathBuf,
}

impl SpecStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists spec files under the root. Order follows the filesystem.
    pub fn discover(&self) -> Result<Vec<PathBuf>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::SpecDirMissing(self.root.clone()));
        }
        discover::discover_spec_files(&self.root).map_err(|source| CatalogError::Walk {
            path: self.root.clone(),
            source,
        })
    }

    pub fn load(&self, path: &Path) -> Result<LoadedDocument, SpecError> {
        let body = std::fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let format = DocumentFormat::from_extension(path.extension().and_then(|e| e.to_str()));
        let raw = parse_document_str(&body, format).map_err(|source| SpecError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if !raw.get("paths").is_some_and(|p| p.is_object()) {
            return Err(SpecError::MissingPaths {
                path: path.to_path_buf(),
            });
        }

        let mut deref = refs::Dereferencer::new(path, raw);
        let document = deref.dereference_root(path)?;
        let (product, version) = namespace_for(&self.root, path);

        Ok(LoadedDocument {
            path: path.to_path_buf(),
            product,
            version,
            document,
            warnings: deref.warnings,
        })
    }
}

/// Derives `(product, version)` from where a document sits under `root`.
///
/// `root/<product>/<version>/.../openapi.json` yields both segments;
/// `root/<product>/openapi.json` defaults the version to `v1`.
pub fn namespace_for(root: &Path, path: &Path) -> (String, String) {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let dirs: Vec<String> = relative
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => s.to_str().map(|s| s.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    match dirs.as_slice() {
        [] => (product_from_file_name(relative), DEFAULT_VERSION.to_string()),
        [product] => (product.clone(), DEFAULT_VERSION.to_string()),
        [product, version, ..] => (product.clone(), version.clone()),
    }
}

fn product_from_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    for suffix in [".openapi.json", ".openapi.yaml", ".openapi.yml"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            return stem.to_string();
        }
    }
    DEFAULT_PRODUCT.to_string()
}
