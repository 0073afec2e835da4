use fbnamedsql::{NamedSqlError, QueryArgs, QueryDef, QueryDefinitions, TransactionMode};

#[test]
fn test_load_definitions_from_file() {
    let queries = QueryDefinitions::from_file("test_json/def.json").unwrap();
    assert_eq!(queries.definitions.len(), 7);

    let select_range = queries.get("select_range").unwrap();
    assert_eq!(select_range.mode, TransactionMode::Read);
    assert_eq!(select_range.param_names(), ["start_id", "end_id"]);
    assert!(select_range.parsed.sql_stmt.contains("id >= ? AND id <= ?"));

    let rename = queries.get("rename").unwrap();
    assert_eq!(rename.mode, TransactionMode::Write);
    assert_eq!(rename.param_names(), ["name", "id"]);
    assert!(rename.parsed.sql_stmt.ends_with("name <> ':name'"));

    let select_all = queries.get("select_all").unwrap();
    assert_eq!(select_all.parsed.param_names, None);
    assert_eq!(select_all.parsed.sql_stmt, select_all.sql);
}

#[test]
fn test_explicit_mode_overrides_derived_mode() {
    let queries = QueryDefinitions::from_file("test_json/def.json").unwrap();
    assert_eq!(queries.get("touch").unwrap().mode, TransactionMode::Write);

    let def = QueryDef::from_sql("SELECT 1", Some(TransactionMode::Write));
    assert_eq!(def.mode, TransactionMode::Write);
    let def = QueryDef::from_sql("/* lead */ select * from t", None);
    assert_eq!(def.mode, TransactionMode::Read);
    // A CTE may wrap a write, so it is not assumed to read
    let def = QueryDef::from_sql("with x as (select 1) insert into t select * from x", None);
    assert_eq!(def.mode, TransactionMode::Write);
}

#[test]
fn test_transaction_mode_parsing() {
    assert_eq!("READ".parse::<TransactionMode>().unwrap(), TransactionMode::Read);
    assert_eq!("write".parse::<TransactionMode>().unwrap(), TransactionMode::Write);

    match "sometimes".parse::<TransactionMode>().unwrap_err() {
        NamedSqlError::UnknownTransactionMode(mode) => assert_eq!(mode, "sometimes"),
        other => panic!("Expected UnknownTransactionMode, got: {other:?}"),
    }

    let queries = QueryDefinitions::from_json(serde_json::json!({
        "q": {"query": "SELECT 1", "mode": "Write"}
    }))
    .unwrap();
    assert_eq!(queries.get("q").unwrap().mode, TransactionMode::Write);
}

#[test]
fn test_query_def_prepare_reuses_rewrite() {
    let def = QueryDef::from_sql("UPDATE t SET a = :a WHERE id = :id", None);
    let prepared = def
        .prepare_json(&serde_json::json!({"a": "x", "id": 3}))
        .unwrap();
    assert_eq!(prepared.sql, "UPDATE t SET a = ? WHERE id = ?");
    assert_eq!(prepared.values.len(), 2);

    let prepared = def.prepare(&QueryArgs::default());
    assert!(prepared.values.iter().all(|v| v.is_null()));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = QueryDefinitions::from_file("non_existent_file.json").unwrap_err();
    assert!(matches!(err, NamedSqlError::Io(_)), "got {err:?}");
}

#[test]
fn test_non_object_root_is_rejected() {
    let err = QueryDefinitions::from_json(serde_json::json!(["SELECT 1"])).unwrap_err();
    assert!(matches!(err, NamedSqlError::ParameterTypeMismatch { .. }));
}

#[test]
fn test_invalid_entries_are_rejected() {
    let cases = [
        (serde_json::json!({"q": "SELECT 1"}), "invalid type"),
        (
            serde_json::json!({"q": {"sql": "SELECT 1"}}),
            "missing field `query`",
        ),
        (
            serde_json::json!({"q": {"query": "SELECT 1", "mode": "sometimes"}}),
            "unknown transaction mode 'sometimes', expected read or write",
        ),
        (
            serde_json::json!({"q": {"query": "SELECT 1", "mode": 1}}),
            "invalid type: integer `1`",
        ),
    ];

    for (json, expected_reason) in cases {
        match QueryDefinitions::from_json(json).unwrap_err() {
            NamedSqlError::InvalidDefinition { name, reason } => {
                assert_eq!(name, "q");
                assert!(
                    reason.contains(expected_reason),
                    "reason {reason:?} should mention {expected_reason:?}"
                );
            }
            other => panic!("Expected InvalidDefinition, got: {other:?}"),
        }
    }
}

#[test]
fn test_unknown_query_name() {
    let queries = QueryDefinitions::default();
    match queries.get("missing").unwrap_err() {
        NamedSqlError::QueryNotFound(name) => assert_eq!(name, "missing"),
        other => panic!("Expected QueryNotFound, got: {other:?}"),
    }
}
