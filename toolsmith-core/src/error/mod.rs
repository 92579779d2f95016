use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to convert YAML document to JSON: {0}")]
    Convert(String),
}

/// Failure to load a single description document.
///
/// These are recoverable at the catalog level: the offending file is skipped.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("{path}: unresolvable $ref '{reference}'")]
    UnresolvedRef { path: PathBuf, reference: String },
    #[error("{path}: document has no 'paths' object")]
    MissingPaths { path: PathBuf },
}

impl SpecError {
    pub fn path(&self) -> &PathBuf {
        match self {
            SpecError::Read { path, .. }
            | SpecError::Parse { path, .. }
            | SpecError::UnresolvedRef { path, .. }
            | SpecError::MissingPaths { path } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("spec directory not found: {0}")]
    SpecDirMissing(PathBuf),
    #[error("failed to walk spec directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
