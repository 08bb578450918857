use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MethodscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog produced no classes ({skipped} record(s) skipped as malformed)")]
    EmptyCatalog { skipped: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<methodscope_api::ApiError> for MethodscopeError {
    fn from(err: methodscope_api::ApiError) -> Self {
        MethodscopeError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MethodscopeError>;

/// A non-fatal problem found while building the graph. The offending
/// record, method or reference is skipped or left unknown.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    #[error("record #{index} skipped: {reason}")]
    MalformedRecord { index: usize, reason: String },
    #[error("class '{class_name}' listed more than once, records merged")]
    DuplicateClass { class_name: String },
    #[error("method '{class_name}.{method_name}' declared more than once")]
    DuplicateMethod {
        class_name: String,
        method_name: String,
    },
    #[error("return type '{return_type}' of '{class_name}.{method_name}' is not a known class")]
    DanglingReturnType {
        class_name: String,
        method_name: String,
        return_type: String,
    },
    #[error("supertype '{supertype}' of '{class_name}' is not a known class")]
    DanglingSupertype {
        class_name: String,
        supertype: String,
    },
    #[error("type '{type_name}' of attribute '{class_name}.{attribute}' is not a known class")]
    DanglingAttributeType {
        class_name: String,
        attribute: String,
        type_name: String,
    },
}
