pub mod invoke;
pub mod stats;
pub mod tools;

use std::sync::Arc;

use secrecy::SecretString;
use toolsmith_core::{CatalogError, OperationCatalog, SpecStore};
use toolsmith_exec::{ExecConfig, ReqwestExecutor, ToolContext, ToolError};

use crate::CatalogArgs;

pub(crate) fn load_catalog(args: &CatalogArgs) -> Result<OperationCatalog, CatalogError> {
    let mut catalog = OperationCatalog::with_prefix(SpecStore::new(args.spec_dir.clone()), args.prefix.clone());
    catalog.load()?;
    Ok(catalog)
}

pub(crate) fn build_context(
    config: ExecConfig,
    base_url: Option<url::Url>,
    token: Option<SecretString>,
) -> Result<ToolContext, ToolError> {
    let executor = ReqwestExecutor::new(base_url, token).map_err(|e| ToolError::configuration(e.to_string()))?;
    ToolContext::build(config, Arc::new(executor))
}

/// A context for offline commands: no base URL, no credentials.
pub(crate) fn offline_context(args: &CatalogArgs) -> Result<ToolContext, ToolError> {
    let config = ExecConfig {
        spec_dir: args.spec_dir.clone(),
        tool_prefix: args.prefix.clone(),
        ..ExecConfig::default()
    };
    build_context(config, None, None)
}
