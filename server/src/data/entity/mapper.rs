//! Result mapping
//!
//! Converts Datasette `{columns, rows}` tables into allow-listed entity
//! records and per-dataset counts.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::data::error::DataError;
use crate::data::traits::QueryResult;

/// Columns exposed on an entity record. Anything else in the table is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityField {
    Dataset,
    EntryDate,
    Reference,
    Entity,
    Name,
    Geojson,
    Typology,
}

impl EntityField {
    pub const ALL: [EntityField; 7] = [
        Self::Dataset,
        Self::EntryDate,
        Self::Reference,
        Self::Entity,
        Self::Name,
        Self::Geojson,
        Self::Typology,
    ];

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::EntryDate => "entry_date",
            Self::Reference => "reference",
            Self::Entity => "entity",
            Self::Name => "name",
            Self::Geojson => "geojson",
            Self::Typology => "typology",
        }
    }
}

/// Entity as returned by the API. Cells keep the JSON type Datasette sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct EntityRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Decoded GeoJSON, `{}` when the entity has no geometry
    pub geojson: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typology: Option<Value>,
}

impl EntityRecord {
    fn set(&mut self, field: EntityField, value: &Value) -> Result<(), DataError> {
        match field {
            EntityField::Geojson => self.geojson = decode_geojson(value)?,
            EntityField::Dataset => self.dataset = scalar(value),
            EntityField::EntryDate => self.entry_date = scalar(value),
            EntityField::Reference => self.reference = scalar(value),
            EntityField::Entity => self.entity = scalar(value),
            EntityField::Name => self.name = scalar(value),
            EntityField::Typology => self.typology = scalar(value),
        }
        Ok(())
    }
}

/// Entity count for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DatasetEntityCount {
    pub dataset: String,
    pub count: u64,
}

/// Null cells stay absent
fn scalar(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other.clone()),
    }
}

/// Text form of a scalar cell; null stays absent
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn decode_geojson(value: &Value) -> Result<Value, DataError> {
    match value {
        Value::Null => Ok(Value::Object(Default::default())),
        Value::String(s) if s.trim().is_empty() => Ok(Value::Object(Default::default())),
        Value::String(s) => serde_json::from_str(s).map_err(|e| {
            DataError::malformed("entity", format!("Undecodable geojson: {}", e))
        }),
        Value::Object(_) => Ok(value.clone()),
        other => Err(DataError::malformed(
            "entity",
            format!("Unexpected geojson value: {}", other),
        )),
    }
}

/// Map a row table into entity records, dropping unlisted columns
pub fn map_rows(result: &QueryResult) -> Result<Vec<EntityRecord>, DataError> {
    let fields: Vec<Option<EntityField>> = result
        .columns
        .iter()
        .map(|c| EntityField::from_column(c))
        .collect();

    result
        .rows
        .iter()
        .map(|row| {
            let mut record = EntityRecord {
                geojson: Value::Object(Default::default()),
                ..Default::default()
            };
            for (field, value) in fields.iter().zip(row) {
                if let Some(field) = field {
                    record.set(*field, value)?;
                }
            }
            Ok(record)
        })
        .collect()
}

/// Read the `_count` cell of a count query result.
///
/// No rows means zero. Without a `_count` column the first cell is used.
pub fn map_count(result: &QueryResult, column: &str) -> Result<u64, DataError> {
    let Some(row) = result.rows.first() else {
        return Ok(0);
    };
    let index = result.column_index(column).unwrap_or(0);
    match row.get(index) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => as_count(value),
    }
}

/// Map `dataset, _count` rows
pub fn map_dataset_counts(
    result: &QueryResult,
    column: &str,
) -> Result<Vec<DatasetEntityCount>, DataError> {
    let dataset_index = result.column_index("dataset").unwrap_or(0);
    let count_index = result.column_index(column).unwrap_or(1);

    result
        .rows
        .iter()
        .filter_map(|row| {
            let dataset = row.get(dataset_index).and_then(scalar_text)?;
            Some((dataset, row.get(count_index)))
        })
        .map(|(dataset, count)| {
            let count = match count {
                None | Some(Value::Null) => 0,
                Some(value) => as_count(value)?,
            };
            Ok(DatasetEntityCount { dataset, count })
        })
        .collect()
}

fn as_count(value: &Value) -> Result<u64, DataError> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| DataError::malformed("entity", format!("Invalid count value: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_entity_field_allow_list() {
        assert_eq!(EntityField::from_column("entry_date"), Some(EntityField::EntryDate));
        assert_eq!(EntityField::from_column("geometry"), None);
        assert_eq!(EntityField::from_column("organisation_entity"), None);
    }

    #[test]
    fn test_map_rows_drops_unlisted_columns() {
        let result = QueryResult::new(
            columns(&["entity", "name", "geometry", "geojson", "organisation_entity"]),
            vec![vec![
                json!(42),
                json!("Oak Tree"),
                json!("POINT(1 2)"),
                json!(r#"{"type": "Point", "coordinates": [1, 2]}"#),
                json!(600001),
            ]],
        );
        let records = map_rows(&result).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.entity, Some(json!(42)));
        assert_eq!(record.name, Some(json!("Oak Tree")));
        assert_eq!(record.geojson, json!({"type": "Point", "coordinates": [1, 2]}));

        let out = serde_json::to_value(record).unwrap();
        assert_eq!(out["entity"], json!(42));
        assert!(out.get("geometry").is_none());
        assert!(out.get("organisation_entity").is_none());
        assert!(out.get("dataset").is_none());
    }

    #[test]
    fn test_map_rows_keeps_cell_types() {
        let result = QueryResult::new(
            columns(&["entity", "reference", "entry_date", "typology"]),
            vec![vec![json!(1700001), json!(17), json!("2024-01-02"), Value::Null]],
        );
        let records = map_rows(&result).unwrap();
        let out = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(
            out,
            json!({
                "entity": 1700001,
                "reference": 17,
                "entry_date": "2024-01-02",
                "geojson": {}
            })
        );
    }

    #[test]
    fn test_map_rows_empty_geojson() {
        let result = QueryResult::new(
            columns(&["entity", "geojson"]),
            vec![vec![json!(1), Value::Null], vec![json!(2), json!("")]],
        );
        let records = map_rows(&result).unwrap();
        assert_eq!(records[0].geojson, json!({}));
        assert_eq!(records[1].geojson, json!({}));
    }

    #[test]
    fn test_map_rows_missing_geojson_column() {
        let result = QueryResult::new(columns(&["entity"]), vec![vec![json!(7)]]);
        let records = map_rows(&result).unwrap();
        assert_eq!(records[0].geojson, json!({}));
    }

    #[test]
    fn test_map_rows_bad_geojson() {
        let result = QueryResult::new(
            columns(&["entity", "geojson"]),
            vec![vec![json!(1), json!("{not json")]],
        );
        let err = map_rows(&result).unwrap_err();
        assert!(matches!(err, DataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_map_count() {
        let result = QueryResult::new(columns(&["_count"]), vec![vec![json!(5)]]);
        assert_eq!(map_count(&result, "_count").unwrap(), 5);

        let empty = QueryResult::new(columns(&["_count"]), vec![]);
        assert_eq!(map_count(&empty, "_count").unwrap(), 0);

        let text = QueryResult::new(columns(&["_count"]), vec![vec![json!("12")]]);
        assert_eq!(map_count(&text, "_count").unwrap(), 12);

        let bad = QueryResult::new(columns(&["_count"]), vec![vec![json!("many")]]);
        assert!(map_count(&bad, "_count").is_err());
    }

    #[test]
    fn test_map_dataset_counts() {
        let result = QueryResult::new(
            columns(&["dataset", "_count"]),
            vec![
                vec![json!("conservation-area"), json!(8000)],
                vec![json!("tree"), json!(12)],
                vec![Value::Null, json!(3)],
            ],
        );
        let counts = map_dataset_counts(&result, "_count").unwrap();
        assert_eq!(
            counts,
            vec![
                DatasetEntityCount {
                    dataset: "conservation-area".into(),
                    count: 8000
                },
                DatasetEntityCount {
                    dataset: "tree".into(),
                    count: 12
                },
            ]
        );
    }
}
