use serde_json::Value;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

impl DocumentFormat {
    /// Picks the format from a file extension, falling back to `Auto`.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("json") => DocumentFormat::Json,
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Auto,
        }
    }
}

pub fn parse_document_str(input: &str, format: DocumentFormat) -> Result<Value, ParseError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str::<Value>(input)?),
        DocumentFormat::Yaml => parse_yaml(input),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

fn parse_yaml(input: &str) -> Result<Value, ParseError> {
    let y = serde_yaml::from_str::<serde_yaml::Value>(input)?;
    serde_json::to_value(y).map_err(|e| ParseError::Convert(e.to_string()))
}

fn parse_document_auto(input: &str) -> Result<Value, ParseError> {
    // JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(input) {
            Ok(v) => Ok(v),
            // YAML is a superset of JSON.
            Err(e) => parse_yaml(input).map_err(|_| ParseError::Json(e)),
        };
    }
    parse_yaml(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_detects_json_and_yaml() {
        let j = parse_document_str(r#"{"openapi":"3.0.0"}"#, DocumentFormat::Auto).unwrap();
        assert_eq!(j["openapi"], "3.0.0");
        let y = parse_document_str("openapi: 3.0.0\npaths: {}\n", DocumentFormat::Auto).unwrap();
        assert_eq!(y["openapi"], "3.0.0");
        assert!(y["paths"].is_object());
    }

    #[test]
    fn broken_yaml_is_rejected() {
        let err = parse_document_str("not: [valid", DocumentFormat::Auto).unwrap_err();
        assert!(format!("{err}").contains("YAML"));
    }

    #[test]
    fn extension_picks_format() {
        assert_eq!(DocumentFormat::from_extension(Some("YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_extension(Some("json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_extension(None), DocumentFormat::Auto);
    }
}
