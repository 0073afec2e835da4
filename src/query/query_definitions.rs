use crate::{
    query::{QueryDef, TransactionMode},
    result::{NamedSqlError, Result},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One catalog entry as written in the JSON file
#[derive(Debug, Deserialize)]
struct QueryEntry {
    query: String,
    #[serde(default)]
    mode: Option<TransactionMode>,
}

/// Collection of parsed SQL query definitions loaded from JSON configuration
#[derive(Debug, Default)]
pub struct QueryDefinitions {
    /// Named query definitions keyed by their identifying name
    pub definitions: HashMap<String, QueryDef>,
}

impl QueryDefinitions {
    /// Load query definitions from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        Self::from_json(json)
    }

    /// Load query definitions from a serde_json::Value object
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(json_map) = json else {
            return Err(NamedSqlError::new_parameter_type_mismatch(
                "object",
                json.to_string(),
            ));
        };

        let mut definitions = HashMap::new();
        for (name, value) in json_map {
            let entry: QueryEntry = serde_json::from_value(value)
                .map_err(|err| NamedSqlError::new_invalid_definition(&name, err.to_string()))?;

            let query_def = QueryDef::from_sql(&entry.query, entry.mode);
            tracing::debug!(
                query = %name,
                mode = %query_def.mode,
                params = query_def.param_names().len(),
                "loaded query definition"
            );
            definitions.insert(name, query_def);
        }
        Ok(QueryDefinitions { definitions })
    }

    /// Look up a definition by name
    pub fn get(&self, query_name: &str) -> Result<&QueryDef> {
        self.definitions
            .get(query_name)
            .ok_or_else(|| NamedSqlError::QueryNotFound(query_name.to_string()))
    }
}
