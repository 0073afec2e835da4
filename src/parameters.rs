use crate::result::{NamedSqlError, Result};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Value bound to a positional marker
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    Blob(Vec<u8>),
}

/// Named parameter bag supplied by the caller, keyed by placeholder name
pub type NamedParams = HashMap<String, ParameterValue>;

impl ParameterValue {
    /// Convert a JSON value into a typed parameter value.
    /// Blobs are given as arrays of byte values (0-255).
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(ParameterValue::Null),
            serde_json::Value::Bool(b) => Ok(ParameterValue::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParameterValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ParameterValue::Float(f))
                } else {
                    Err(NamedSqlError::new_parameter_type_mismatch(
                        "integer or float",
                        n.to_string(),
                    ))
                }
            }
            serde_json::Value::String(s) => Ok(ParameterValue::String(s.clone())),
            serde_json::Value::Array(items) => {
                let mut bytes = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let byte = item
                        .as_u64()
                        .and_then(|num| u8::try_from(num).ok())
                        .ok_or_else(|| {
                            NamedSqlError::new_parameter_type_mismatch(
                                format!("byte values (0-255) at index {i}"),
                                item.to_string(),
                            )
                        })?;
                    bytes.push(byte);
                }
                Ok(ParameterValue::Blob(bytes))
            }
            serde_json::Value::Object(_) => Err(NamedSqlError::new_parameter_type_mismatch(
                "string, number, boolean, null or byte array",
                value.to_string(),
            )),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Null)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for ParameterValue {
    fn from(value: NaiveDateTime) -> Self {
        ParameterValue::Date(value)
    }
}

impl From<Vec<u8>> for ParameterValue {
    fn from(value: Vec<u8>) -> Self {
        ParameterValue::Blob(value)
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParameterValue::Null, Into::into)
    }
}

/// Build a typed parameter bag from a JSON object
pub fn named_params_from_json(
    params: &serde_json::Map<String, serde_json::Value>,
) -> Result<NamedParams> {
    params
        .iter()
        .map(|(name, value)| Ok((name.clone(), ParameterValue::from_json(value)?)))
        .collect()
}

/// Order values by the placeholder names of a rewritten statement.
/// Repeated names repeat the value; names missing from the bag bind NULL.
pub fn bind_positional(param_names: &[String], params: &NamedParams) -> Vec<ParameterValue> {
    param_names
        .iter()
        .map(|name| match params.get(name) {
            Some(value) => value.clone(),
            None => {
                tracing::debug!(name = %name, "parameter not provided, binding NULL");
                ParameterValue::Null
            }
        })
        .collect()
}

impl rusqlite::ToSql for ParameterValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, Value, ValueRef};

        Ok(match self {
            ParameterValue::Null => ToSqlOutput::Owned(Value::Null),
            ParameterValue::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            ParameterValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            ParameterValue::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            // SQLite represents booleans as integers
            ParameterValue::Boolean(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            ParameterValue::Date(d) => {
                ToSqlOutput::Owned(Value::Text(d.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
            }
            ParameterValue::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}
