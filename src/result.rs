use thiserror::Error;

/// Main error type for the data-access layer around the named-parameter rewriter
#[derive(Error, Debug)]
pub enum NamedSqlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Query not found: {0}")]
    QueryNotFound(String),
    #[error("Parameter type mismatch: expected {expected}, got {got}")]
    ParameterTypeMismatch { expected: String, got: String },
    #[error("unknown transaction mode '{0}', expected read or write")]
    UnknownTransactionMode(String),
    #[error("statement writes but runs in a read transaction: {sql}")]
    WriteInReadTransaction { sql: String },
    #[error("Invalid query definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },
}

impl NamedSqlError {
    pub fn new_parameter_type_mismatch(
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        NamedSqlError::ParameterTypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn new_invalid_definition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        NamedSqlError::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using NamedSqlError
pub type Result<T> = std::result::Result<T, NamedSqlError>;
