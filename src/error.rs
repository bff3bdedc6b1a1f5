use crate::model::TypeIdentity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("resource {0:?} not found, use `kubectl api-resources` for the supported list")]
    UnknownResource(String),
    #[error("couldn't find resource for \"{0}\"")]
    SchemaNotFound(TypeIdentity),
    #[error("field {field:?} does not exist in {parent}")]
    FieldPath { field: String, parent: String },
    #[error("bad pattern: {0}")]
    BadPattern(#[from] regex::Error),
    #[error("invalid schema document: {0}")]
    InvalidSchema(#[from] serde_json::Error),
}
