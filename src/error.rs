//! Typed error type for the mapping layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrmError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serializer error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("date error: {0}")]
    Date(#[from] chrono::ParseError),

    /// The mapping text could not be parsed.
    #[error("mapping error at line {line}: {message}")]
    Mapping { line: usize, message: String },

    /// An entity type was used without a `CLASS` block in the mapping.
    #[error("class '{0}' is not declared in the mapping")]
    UnmappedClass(String),

    /// Insert of a primary key that is already stored.
    #[error("duplicate key {key} for class '{class}'")]
    DuplicateKey { class: String, key: String },

    #[error("no '{class}' object with key {key}")]
    NotFound { class: String, key: String },
}

pub type OrmResult<T> = Result<T, OrmError>;
