use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::model::{HttpMethod, OperationDefinition};

/// Filters for [`crate::OperationCatalog::search`]. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Matches when the operation carries any of these tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paginated: Option<bool>,
    /// Case-insensitive substring over tool name, operationId, summary and description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn matches(&self, op: &OperationDefinition) -> bool {
        if let Some(product) = &self.product {
            if !op.product.eq_ignore_ascii_case(product) {
                return false;
            }
        }
        if let Some(method) = self.method {
            if op.method != method {
                return false;
            }
        }
        if !self.tags.is_empty()
            && !op
                .tags
                .iter()
                .any(|t| self.tags.iter().any(|want| want.eq_ignore_ascii_case(t)))
        {
            return false;
        }
        if let Some(paginated) = self.paginated {
            if op.paginated != paginated {
                return false;
            }
        }
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let hit = [
                Some(op.tool_name.as_str()),
                Some(op.operation_id.as_str()),
                op.summary.as_deref(),
                op.description.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub by_product: BTreeMap<String, usize>,
    pub by_method: BTreeMap<String, usize>,
    pub paginated: usize,
    pub with_body: usize,
}

impl CatalogStats {
    pub(crate) fn from_operations<'a>(ops: impl Iterator<Item = &'a OperationDefinition>) -> Self {
        let mut stats = CatalogStats::default();
        for op in ops {
            stats.total += 1;
            *stats.by_product.entry(op.product.clone()).or_default() += 1;
            *stats.by_method.entry(op.method.to_string()).or_default() += 1;
            if op.paginated {
                stats.paginated += 1;
            }
            if op.has_body() {
                stats.with_body += 1;
            }
        }
        stats
    }
}
