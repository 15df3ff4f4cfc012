//! Query backend trait
//!
//! The engine only needs one capability from the outside world: run a compiled
//! `SELECT` and hand back columns and rows. The Datasette HTTP client
//! implements it for production; tests use an in-memory implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::data::entity::CompiledQuery;
use crate::data::error::DataError;

/// Tabular result of a remote query
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self { columns, rows }
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Executes compiled queries against a tabular store
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run a query. An empty table is `Ok`; transport and remote failures are `Err`.
    async fn execute(&self, query: &CompiledQuery) -> Result<QueryResult, DataError>;

    /// Short backend name for logs and errors
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_deserialize_datasette_shape() {
        let json = r#"{
            "database": "entity",
            "columns": ["_count"],
            "rows": [[5]],
            "truncated": false
        }"#;
        let result: QueryResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.columns, vec!["_count"]);
        assert_eq!(result.rows, vec![vec![serde_json::json!(5)]]);
    }

    #[test]
    fn test_query_result_missing_rows_defaults_empty() {
        let result: QueryResult = serde_json::from_str(r#"{"columns": []}"#).unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_column_index() {
        let result = QueryResult::new(vec!["entity".into(), "name".into()], vec![]);
        assert_eq!(result.column_index("name"), Some(1));
        assert_eq!(result.column_index("missing"), None);
    }
}
