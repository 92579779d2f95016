use std::collections::BTreeMap;

use crate::catalog::model::{ParamLocation, ParameterDef, ResponseDef};

const PAGING_PARAM_HINTS: &[&str] = &["limit", "offset", "page", "pagesize", "cursor"];
const PAGING_RESPONSE_FIELDS: &[&str] = &["totalCount", "nextPage", "cursor", "hasMore"];

/// Heuristic pagination detection. False negatives are expected.
pub fn is_paginated(parameters: &[ParameterDef], responses: &BTreeMap<String, ResponseDef>) -> bool {
    let by_param = parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .any(|p| {
            let name = p.name.to_ascii_lowercase();
            PAGING_PARAM_HINTS.iter().any(|hint| name.contains(hint))
        });
    if by_param {
        return true;
    }

    responses
        .get("200")
        .and_then(|r| r.json_schema())
        .and_then(|s| s.get("properties"))
        .and_then(|p| p.as_object())
        .is_some_and(|props| PAGING_RESPONSE_FIELDS.iter().any(|f| props.contains_key(*f)))
}
