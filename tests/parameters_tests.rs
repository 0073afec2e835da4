use chrono::NaiveDate;
use fbnamedsql::{
    NamedParams, NamedSqlError, ParameterValue, QueryArgs, bind_positional, prepare,
};

#[test]
fn test_bind_repeats_values_for_repeated_names() {
    let mut params = NamedParams::new();
    params.insert("id".to_string(), ParameterValue::Integer(7));

    let prepared = prepare(
        "SELECT :id FROM t WHERE id = :id",
        &QueryArgs::Named(params),
    );
    assert_eq!(prepared.sql, "SELECT ? FROM t WHERE id = ?");
    assert_eq!(
        prepared.values,
        vec![ParameterValue::Integer(7), ParameterValue::Integer(7)]
    );
}

#[test]
fn test_missing_names_bind_null() {
    let mut params = NamedParams::new();
    params.insert("a".to_string(), "x".into());
    let names = vec!["a".to_string(), "b".to_string()];

    let values = bind_positional(&names, &params);
    assert_eq!(values, vec![ParameterValue::from("x"), ParameterValue::Null]);
    assert!(values[1].is_null());
}

#[test]
fn test_extra_names_are_ignored() {
    let mut params = NamedParams::new();
    params.insert("a".to_string(), 1i64.into());
    params.insert("unused".to_string(), true.into());

    let prepared = prepare("SELECT * FROM t WHERE a = :a", &QueryArgs::Named(params));
    assert_eq!(prepared.values, vec![ParameterValue::Integer(1)]);
}

#[test]
fn test_positional_args_bypass_rewriter() {
    let sql = "SELECT * FROM t WHERE a = ? AND note = ':kept'";
    let args = QueryArgs::Positional(vec![ParameterValue::Float(1.5)]);

    let prepared = prepare(sql, &args);
    assert_eq!(prepared.sql, sql);
    assert_eq!(prepared.values, vec![ParameterValue::Float(1.5)]);

    // Named-looking text is left alone on the positional path
    let prepared = prepare("SELECT :a", &QueryArgs::Positional(vec![]));
    assert_eq!(prepared.sql, "SELECT :a");
    assert!(prepared.values.is_empty());
}

#[test]
fn test_json_object_becomes_named_args() {
    let args = QueryArgs::from_json(&serde_json::json!({
        "name": "Jane",
        "age": 31,
        "score": 9.5,
        "active": false,
        "nickname": null,
        "avatar": [0, 127, 255]
    }))
    .unwrap();

    let QueryArgs::Named(params) = args else {
        panic!("Expected named args");
    };
    assert_eq!(params["name"], ParameterValue::String("Jane".to_string()));
    assert_eq!(params["age"], ParameterValue::Integer(31));
    assert_eq!(params["score"], ParameterValue::Float(9.5));
    assert_eq!(params["active"], ParameterValue::Boolean(false));
    assert_eq!(params["nickname"], ParameterValue::Null);
    assert_eq!(params["avatar"], ParameterValue::Blob(vec![0, 127, 255]));
}

#[test]
fn test_json_array_becomes_positional_args() {
    let args = QueryArgs::from_json(&serde_json::json!([1, "two"])).unwrap();
    assert_eq!(
        args,
        QueryArgs::Positional(vec![
            ParameterValue::Integer(1),
            ParameterValue::String("two".to_string())
        ])
    );
}

#[test]
fn test_json_scalar_args_are_rejected() {
    let err = QueryArgs::from_json(&serde_json::json!("nope")).unwrap_err();
    match err {
        NamedSqlError::ParameterTypeMismatch { expected, got } => {
            assert_eq!(expected, "object or array");
            assert_eq!(got, "\"nope\"");
        }
        other => panic!("Expected ParameterTypeMismatch, got: {other:?}"),
    }
}

#[test]
fn test_invalid_blob_bytes_are_rejected() {
    let err = ParameterValue::from_json(&serde_json::json!([1, 256])).unwrap_err();
    match err {
        NamedSqlError::ParameterTypeMismatch { expected, got } => {
            assert_eq!(expected, "byte values (0-255) at index 1");
            assert_eq!(got, "256");
        }
        other => panic!("Expected ParameterTypeMismatch, got: {other:?}"),
    }

    let err = ParameterValue::from_json(&serde_json::json!({"nested": 1})).unwrap_err();
    assert!(matches!(err, NamedSqlError::ParameterTypeMismatch { .. }));
}

#[test]
fn test_value_conversions() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_opt(13, 45, 0)
        .unwrap();
    assert_eq!(ParameterValue::from(date), ParameterValue::Date(date));
    assert_eq!(ParameterValue::from(None::<i64>), ParameterValue::Null);
    assert_eq!(ParameterValue::from(Some(3i64)), ParameterValue::Integer(3));
    assert_eq!(
        ParameterValue::from(vec![1u8, 2]),
        ParameterValue::Blob(vec![1, 2])
    );
}
