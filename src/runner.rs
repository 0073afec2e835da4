use crate::{
    QueryDefinitions,
    query::{PreparedQuery, QueryArgs, TransactionMode},
    result::{NamedSqlError, Result},
};
use rusqlite::{Connection, TransactionBehavior};

/// Outcome of running one statement
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// One JSON object per row, keyed by column name; empty for statements without result columns
    pub data: Vec<serde_json::Value>,
    /// Rows changed by a statement without result columns
    pub affected_rows: usize,
    /// The SQL actually handed to the driver
    pub sql: String,
}

/// Trait for executing named-parameter SQL queries against a database backend
pub trait QueryRunner {
    fn query_run(
        &mut self,
        queries: &QueryDefinitions,
        query_name: &str,
        params: &serde_json::Value,
    ) -> Result<QueryResult>;
}

/// Database connection enum that holds different database backends
pub enum DatabaseConnection {
    /// SQLite connection
    SQLite(Connection),
}

impl QueryRunner for DatabaseConnection {
    fn query_run(
        &mut self,
        queries: &QueryDefinitions,
        query_name: &str,
        params: &serde_json::Value,
    ) -> Result<QueryResult> {
        match self {
            DatabaseConnection::SQLite(conn) => query_run_sqlite(conn, queries, query_name, params),
        }
    }
}

/// Run a catalog query by name, with parameters given as a JSON object (named) or array (positional)
pub fn query_run_sqlite(
    conn: &mut Connection,
    queries: &QueryDefinitions,
    query_name: &str,
    params: &serde_json::Value,
) -> Result<QueryResult> {
    let query = queries.get(query_name)?;
    let prepared = query.prepare_json(params)?;
    tracing::debug!(query = %query_name, mode = %query.mode, "running query");
    execute_sqlite(conn, query.mode, &prepared)
}

/// Run an ad-hoc SQL template with the given arguments.
/// The transaction mode comes from SQLite itself: read-only statements read, all others write.
pub fn run_sql_sqlite(
    conn: &mut Connection,
    sql: &str,
    args: &QueryArgs,
) -> Result<QueryResult> {
    let prepared = crate::query::prepare(sql, args);
    let mode = if conn.prepare(&prepared.sql)?.readonly() {
        TransactionMode::Read
    } else {
        TransactionMode::Write
    };
    execute_sqlite(conn, mode, &prepared)
}

/// Execute a prepared statement inside its own transaction.
/// Read transactions are rolled back once rows are collected, write transactions are committed.
/// A statement that writes is refused in a read transaction.
pub fn execute_sqlite(
    conn: &mut Connection,
    mode: TransactionMode,
    prepared: &PreparedQuery,
) -> Result<QueryResult> {
    let behavior = match mode {
        TransactionMode::Read => TransactionBehavior::Deferred,
        TransactionMode::Write => TransactionBehavior::Immediate,
    };
    let tx = conn.transaction_with_behavior(behavior)?;

    let result = execute_in_transaction(&tx, mode, prepared)?;

    match mode {
        TransactionMode::Read => tx.rollback()?,
        TransactionMode::Write => tx.commit()?,
    }
    Ok(result)
}

fn execute_in_transaction(
    tx: &rusqlite::Transaction,
    mode: TransactionMode,
    prepared: &PreparedQuery,
) -> Result<QueryResult> {
    let mut stmt = tx.prepare(&prepared.sql)?;
    if mode == TransactionMode::Read && !stmt.readonly() {
        return Err(NamedSqlError::WriteInReadTransaction {
            sql: prepared.sql.clone(),
        });
    }
    let params = rusqlite::params_from_iter(prepared.values.iter());

    if stmt.column_count() == 0 {
        let affected_rows = stmt.execute(params)?;
        tracing::trace!(affected_rows, "statement executed");
        return Ok(QueryResult {
            data: Vec::new(),
            affected_rows,
            sql: prepared.sql.clone(),
        });
    }

    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let rows = stmt.query_map(params, |row| {
        let mut obj = serde_json::Map::new();
        for (idx, column) in column_names.iter().enumerate() {
            obj.insert(column.clone(), value_ref_to_json(row.get_ref(idx)?));
        }
        Ok(serde_json::Value::Object(obj))
    })?;
    let data = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    tracing::trace!(rows = data.len(), "query returned rows");

    Ok(QueryResult {
        data,
        affected_rows: 0,
        sql: prepared.sql.clone(),
    })
}

fn value_ref_to_json(value: rusqlite::types::ValueRef<'_>) -> serde_json::Value {
    use rusqlite::types::ValueRef;

    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::Number(i.into()),
        ValueRef::Real(r) => serde_json::Number::from_f64(r)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(s) => serde_json::Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => serde_json::Value::Array(
            b.iter()
                .map(|&byte| serde_json::Value::Number(byte.into()))
                .collect(),
        ),
    }
}
