use crate::{
    named_params::{self, ParsedSql},
    query::{PreparedQuery, QueryArgs, prepare_parsed},
    result::{NamedSqlError, Result},
    str_utils,
};
use serde::Deserialize;
use std::str::FromStr;

/// Transaction kind a statement runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TransactionMode {
    Read,
    Write,
}

impl TransactionMode {
    /// Derive the mode from the statement's leading keyword: only SELECT reads.
    /// A WITH statement may carry an INSERT/UPDATE/DELETE, so it writes.
    pub fn for_sql(sql: &str) -> Self {
        match str_utils::leading_keyword(sql).as_deref() {
            Some("SELECT") => TransactionMode::Read,
            _ => TransactionMode::Write,
        }
    }
}

impl FromStr for TransactionMode {
    type Err = NamedSqlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(TransactionMode::Read),
            "write" => Ok(TransactionMode::Write),
            _ => Err(NamedSqlError::UnknownTransactionMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionMode {
    type Error = NamedSqlError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionMode::Read => "read",
            TransactionMode::Write => "write",
        };
        write!(f, "{s}")
    }
}

/// Represents a SQL template parsed once for repeated execution
#[derive(Debug, Clone)]
pub struct QueryDef {
    pub sql: String,
    pub parsed: ParsedSql,
    pub mode: TransactionMode,
}

impl QueryDef {
    /// Create a new QueryDef from a SQL template; without an explicit mode it is derived from the SQL
    pub fn from_sql(sql: &str, mode: Option<TransactionMode>) -> Self {
        QueryDef {
            sql: sql.to_string(),
            parsed: named_params::parse(sql),
            mode: mode.unwrap_or_else(|| TransactionMode::for_sql(sql)),
        }
    }

    /// Placeholder names in marker order
    pub fn param_names(&self) -> &[String] {
        self.parsed.names()
    }

    /// Bind caller arguments against the cached rewrite
    pub fn prepare(&self, args: &QueryArgs) -> PreparedQuery {
        match args {
            QueryArgs::Named(params) => prepare_parsed(&self.parsed, params),
            QueryArgs::Positional(values) => PreparedQuery {
                sql: self.sql.clone(),
                values: values.clone(),
            },
        }
    }

    /// Prepare from a JSON parameter object or array
    pub fn prepare_json(&self, params: &serde_json::Value) -> Result<PreparedQuery> {
        let args = QueryArgs::from_json(params)?;
        Ok(self.prepare(&args))
    }
}
