//! ica-schema: declarative solver/section/field structure.

pub mod load;
pub mod raw;
pub mod schema;

pub use load::{BUILTIN_STRUCTURE, load_structure};
pub use raw::{RawField, RawStructure};
pub use schema::*;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("Unsupported field type '{kind}' for field '{field}'")]
    UnsupportedFieldType { field: String, kind: String },

    #[error("Unrecognized key-value list entry '{field}': needs a type or nested fields")]
    UnrecognizedGroupEntry { field: String },

    #[error("Malformed structure at {context}: {reason}")]
    Malformed { context: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
