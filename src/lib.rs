pub mod named_params;
pub mod parameters;
pub mod query;
pub mod result;
pub mod runner;
pub mod str_utils;

// Re-export types for convenience
pub use named_params::{ParsedSql, parse, parse_with};
pub use parameters::{NamedParams, ParameterValue, bind_positional};
pub use query::{PreparedQuery, QueryArgs, QueryDef, QueryDefinitions, TransactionMode, prepare};
pub use result::{NamedSqlError, Result};
pub use runner::{
    DatabaseConnection, QueryResult, QueryRunner, execute_sqlite, query_run_sqlite, run_sql_sqlite,
};

// Re-export third-party types used in the public API to provide fallback for dependency conflicts
pub use serde_json::Value as JsonValue;

// Re-export third-party types used in the public API to provide fallback for dependency conflicts
pub use rusqlite::Connection as SqliteConnection;
