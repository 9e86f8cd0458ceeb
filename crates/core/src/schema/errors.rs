//! Error types for schema construction and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when building or loading type schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field descriptor has an empty path.
    #[error("field with label '{label}' has an empty path")]
    EmptyPath { label: String },

    /// Two descriptors share the same path.
    #[error("duplicate field path: {0}")]
    DuplicatePath(String),

    /// An array field declares no sub-fields.
    #[error("array field '{0}' declares no sub-fields")]
    EmptyArray(String),

    /// A non-array field declares sub-fields.
    #[error("field '{0}' declares sub-fields but is not an array")]
    UnexpectedSubFields(String),

    /// A cross-field rule reads a field the schema does not declare.
    #[error("rule references undeclared field: {0}")]
    UnknownRulePath(String),

    /// The fallback schema cannot be registered under a type.
    #[error("cannot register a schema without an element type")]
    Untyped,

    /// A schema file names an unknown element type.
    #[error("unknown element type '{name}' in {path}")]
    UnknownType { name: String, path: PathBuf },

    /// Schema directory does not exist.
    #[error("schema directory does not exist: {0}")]
    MissingDir(String),

    /// Error walking the schema directory.
    #[error("failed to read schema directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),

    /// Error reading a schema file.
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a schema file.
    #[error("failed to parse schema file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
