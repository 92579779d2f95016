use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Key used for this verb inside an OpenAPI path item.
    pub fn path_item_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported HTTP method: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    pub(crate) fn from_openapi(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    /// Declared schema; `Value::Null` when the parameter declares none.
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBodyDef {
    pub required: bool,
    /// Content type -> schema.
    pub content: BTreeMap<String, Value>,
}

impl RequestBodyDef {
    /// Schema for the JSON media type, if one is declared.
    pub fn json_schema(&self) -> Option<&Value> {
        json_media_schema(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content type -> schema.
    pub content: BTreeMap<String, Value>,
}

impl ResponseDef {
    pub fn json_schema(&self) -> Option<&Value> {
        json_media_schema(&self.content)
    }
}

pub(crate) fn is_json_media_type(ct: &str) -> bool {
    let base = ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase();
    base == "application/json" || base.ends_with("+json") || base == "*/*"
}

fn json_media_schema(content: &BTreeMap<String, Value>) -> Option<&Value> {
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(ct, _)| is_json_media_type(ct))
                .map(|(_, s)| s)
        })
}

/// One HTTP capability extracted from a description document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub operation_id: String,
    pub tool_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub product: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Vec<ParameterDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyDef>,
    /// Status key (`"200"`, `"4XX"`, `"default"`) -> response.
    pub responses: BTreeMap<String, ResponseDef>,
    pub tags: Vec<String>,
    pub paginated: bool,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    pub source: PathBuf,
    /// Raw `x-*` keys from the operation object.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub extensions: BTreeMap<String, Value>,
}

impl OperationDefinition {
    pub fn parameters_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParameterDef> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    pub fn has_body(&self) -> bool {
        self.request_body.is_some()
    }

    /// Picks the response declared for `status`: exact code, then `NXX`, then `default`.
    pub fn response_for(&self, status: u16) -> Option<(&str, &ResponseDef)> {
        let exact = status.to_string();
        let range = format!("{}XX", status / 100);
        let found = [exact.as_str(), range.as_str(), "default"]
            .into_iter()
            .find_map(|key| {
                self.responses
                    .get_key_value(key)
                    .or_else(|| {
                        self.responses
                            .iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    })
                    .map(|(k, v)| (k.as_str(), v))
            });
        found
    }
}
