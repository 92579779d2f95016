#![forbid(unsafe_code)]

//! OpenAPI ingestion for toolsmith: spec discovery, the operation catalog, and
//! the schema-to-validator compiler. Nothing here touches the network.

pub mod catalog;
pub mod error;
pub mod parser;
pub mod schema;
pub mod spec;

pub use crate::catalog::{
    CatalogStats, HttpMethod, LoadFailure, OperationCatalog, OperationDefinition, ParamLocation,
    ParameterDef, SearchQuery,
};
pub use crate::error::{CatalogError, ParseError, SpecError};
pub use crate::parser::{parse_document_str, DocumentFormat};
pub use crate::schema::{compile, ValidationIssue, ValidationResult, Validator};
pub use crate::spec::{LoadedDocument, SpecStore};
