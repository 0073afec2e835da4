pub mod query_def;
pub mod query_definitions;

pub use query_def::{QueryDef, TransactionMode};
pub use query_definitions::QueryDefinitions;

use crate::{
    named_params,
    parameters::{self, NamedParams, ParameterValue},
    result::{NamedSqlError, Result},
};

/// Arguments supplied by the caller for one statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArgs {
    /// Name-keyed values, matched against `:name` placeholders
    Named(NamedParams),
    /// Values already in marker order; the SQL is used as-is
    Positional(Vec<ParameterValue>),
}

impl QueryArgs {
    /// A JSON object becomes named arguments, a JSON array positional ones
    pub fn from_json(params: &serde_json::Value) -> Result<Self> {
        match params {
            serde_json::Value::Object(map) => {
                Ok(QueryArgs::Named(parameters::named_params_from_json(map)?))
            }
            serde_json::Value::Array(items) => items
                .iter()
                .map(ParameterValue::from_json)
                .collect::<Result<Vec<_>>>()
                .map(QueryArgs::Positional),
            other => Err(NamedSqlError::new_parameter_type_mismatch(
                "object or array",
                other.to_string(),
            )),
        }
    }
}

impl Default for QueryArgs {
    fn default() -> Self {
        QueryArgs::Named(NamedParams::new())
    }
}

/// A statement ready for a positional driver
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    pub values: Vec<ParameterValue>,
}

/// Prepare a SQL template for execution.
/// Named arguments go through the rewriter; positional arguments bypass it.
pub fn prepare(sql: &str, args: &QueryArgs) -> PreparedQuery {
    match args {
        QueryArgs::Named(params) => {
            let parsed = named_params::parse(sql);
            prepare_parsed(&parsed, params)
        }
        QueryArgs::Positional(values) => PreparedQuery {
            sql: sql.to_string(),
            values: values.clone(),
        },
    }
}

pub(crate) fn prepare_parsed(
    parsed: &named_params::ParsedSql,
    params: &NamedParams,
) -> PreparedQuery {
    PreparedQuery {
        sql: parsed.sql_stmt.clone(),
        values: parameters::bind_positional(parsed.names(), params),
    }
}
