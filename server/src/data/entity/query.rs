//! Entity query compiler
//!
//! Composes the predicate fragments into complete `SELECT` statements over the
//! `entity LEFT OUTER JOIN geometry` relation.

use serde::Serialize;
use utoipa::ToSchema;

use super::filters::{
    FilterSet, SqlParams, build_curie_filter, build_lifecycle_filter, build_membership_filter,
    build_spatial_filter, build_temporal_filter,
};
use crate::utils::sql::inline_params;

const ROW_SELECT: &str = "SELECT entity.*, geometry.geojson";
const COUNT_SELECT: &str = "SELECT DISTINCT COUNT(*) AS _count";
const FROM_JOIN: &str = " FROM entity LEFT OUTER JOIN geometry ON entity.entity = geometry.entity";

/// Column holding the result of a count query
pub const COUNT_COLUMN: &str = "_count";

/// Which variant of the entity query to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Entity rows with ordering, cursor and limit
    Rows,
    /// Single `_count` row, no pagination
    Count,
}

/// A compiled, immutable SQL statement with named placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CompiledQuery {
    /// SQL text using `:p0`, `:p1`, ... placeholders
    pub sql: String,
    /// Bound values, index `N` belongs to `:pN`
    pub params: Vec<String>,
    #[serde(skip)]
    pub count_only: bool,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, params: Vec<String>, count_only: bool) -> Self {
        Self {
            sql: sql.into(),
            params,
            count_only,
        }
    }

    /// Self-contained SQL with every placeholder replaced by a sanitized literal
    pub fn to_inline_sql(&self) -> String {
        inline_params(&self.sql, &self.params)
    }

    /// Named parameters as `(pN, value)` pairs
    pub fn named_params(&self) -> impl Iterator<Item = (String, &str)> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("p{}", i), v.as_str()))
    }
}

/// Compile a filter set into a row or count query.
///
/// Fragments are combined in a fixed order (membership, curie, lifecycle,
/// temporal, spatial) so equal filter sets produce byte-identical SQL.
pub fn compile(filters: &FilterSet, kind: QueryKind) -> CompiledQuery {
    let mut params = SqlParams::default();

    let mut conditions: Vec<String> = [
        build_membership_filter(filters, &mut params),
        build_curie_filter(filters, &mut params),
        build_lifecycle_filter(filters),
        build_temporal_filter(filters, &mut params),
        build_spatial_filter(filters, &mut params),
    ]
    .into_iter()
    .flatten()
    .collect();

    if kind == QueryKind::Rows
        && let Some(cursor) = &filters.next_entity
    {
        conditions.push(format!("entity.entity > {}", params.bind(cursor.as_str())));
    }

    let where_clause = if conditions.is_empty() {
        "1=1".to_string()
    } else {
        conditions.join(" AND ")
    };

    let select = match kind {
        QueryKind::Rows => ROW_SELECT,
        QueryKind::Count => COUNT_SELECT,
    };
    let mut sql = format!("{}{} WHERE {}", select, FROM_JOIN, where_clause);

    if kind == QueryKind::Rows {
        sql.push_str(&format!(" ORDER BY entity.entity LIMIT {}", filters.limit));
    }

    CompiledQuery::new(sql, params.values, kind == QueryKind::Count)
}

/// Entity counts grouped by dataset, optionally restricted to one dataset
pub fn compile_dataset_counts(dataset: Option<&str>) -> CompiledQuery {
    let mut params = SqlParams::default();
    let where_clause = match dataset {
        Some(d) => format!(" WHERE dataset = {}", params.bind(d)),
        None => String::new(),
    };
    let sql = format!(
        "SELECT dataset, COUNT(DISTINCT entity) AS {} FROM entity{} GROUP BY dataset ORDER BY dataset",
        COUNT_COLUMN, where_clause
    );
    CompiledQuery::new(sql, params.values, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::entity::filters::{
        DateMatch, EntityQueryParams, EntriesOption, GeometryRelation,
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_compile_no_filters() {
        let query = compile(&FilterSet::default(), QueryKind::Rows);
        assert_eq!(
            query.sql,
            "SELECT entity.*, geometry.geojson FROM entity LEFT OUTER JOIN geometry \
             ON entity.entity = geometry.entity WHERE 1=1 ORDER BY entity.entity LIMIT 10"
        );
        assert!(query.params.is_empty());
        assert!(!query.count_only);
    }

    #[test]
    fn test_compile_count_has_no_pagination() {
        let filters = FilterSet {
            dataset: strings(&["brownfield-site"]),
            next_entity: Some("42".into()),
            limit: 1,
            ..Default::default()
        };
        let query = compile(&filters, QueryKind::Count);
        assert!(query.count_only);
        assert!(query.sql.starts_with("SELECT DISTINCT COUNT(*) AS _count FROM entity"));
        assert!(query.sql.ends_with("WHERE (entity.dataset = :p0)"));
        assert!(!query.sql.contains("ORDER BY"));
        assert!(!query.sql.contains("LIMIT"));
        assert_eq!(query.params, vec!["brownfield-site"]);
    }

    #[test]
    fn test_compile_cursor_tail() {
        let filters = FilterSet {
            next_entity: Some("42".into()),
            limit: 5,
            ..Default::default()
        };
        let query = compile(&filters, QueryKind::Rows);
        assert!(query.sql.ends_with("WHERE entity.entity > :p0 ORDER BY entity.entity LIMIT 5"));
        assert!(
            query
                .to_inline_sql()
                .ends_with("entity.entity > '42' ORDER BY entity.entity LIMIT 5")
        );
    }

    #[test]
    fn test_compile_cursor_joined_with_conditions() {
        let filters = FilterSet {
            entries: Some(EntriesOption::Current),
            next_entity: Some("100".into()),
            ..Default::default()
        };
        let query = compile(&filters, QueryKind::Rows);
        assert!(query.sql.contains(
            "WHERE entity.end_date is '' AND entity.entity > :p0 ORDER BY entity.entity"
        ));
    }

    #[test]
    fn test_compile_fragment_order() {
        let filters = FilterSet {
            dataset: strings(&["tree"]),
            curie: strings(&["statistical-geography:E09000033"]),
            entries: Some(EntriesOption::Historical),
            entry_end_date_match: Some(DateMatch::Empty),
            longitude: Some("-0.1".into()),
            latitude: Some("51.5".into()),
            geometry_match: Some(GeometryRelation::Intersects),
            ..Default::default()
        };
        let sql = compile(&filters, QueryKind::Rows).sql;
        let positions: Vec<usize> = [
            "entity.dataset =",
            "entity.prefix =",
            "entity.end_date is not ''",
            "entity.end_date = ''",
            "INTERSECTS(",
        ]
        .iter()
        .map(|needle| sql.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", sql);
    }

    #[test]
    fn test_compile_inline_temporal_literal() {
        let filters = FilterSet {
            entry_start_date_year: Some("2020".into()),
            entry_start_date_match: Some(DateMatch::Since),
            ..Default::default()
        };
        let inline = compile(&filters, QueryKind::Rows).to_inline_sql();
        assert!(inline.contains(
            "WHERE (entity.start_date != '' AND entity.start_date >= '2020-01-01')"
        ));
    }

    #[test]
    fn test_compile_inline_point_literal() {
        let filters = FilterSet {
            longitude: Some("1.23456789".into()),
            latitude: Some("-0.00001".into()),
            ..Default::default()
        };
        let inline = compile(&filters, QueryKind::Rows).to_inline_sql();
        assert!(inline.contains("GeomFromText('POINT(1.234568 -0.000010)')"));
    }

    #[test]
    fn test_compile_inline_sanitizes_values() {
        let filters = FilterSet {
            reference: strings(&["x' OR '1'='1"]),
            ..Default::default()
        };
        let inline = compile(&filters, QueryKind::Rows).to_inline_sql();
        assert!(inline.contains("(entity.reference = 'x'' OR ''1''=''1')"));
    }

    #[test]
    fn test_compile_is_deterministic_after_normalization() {
        let a = FilterSet::normalize(EntityQueryParams {
            dataset: strings(&["b", "a", "b"]),
            typology: strings(&["geography"]),
            limit: 10,
            ..Default::default()
        });
        let b = FilterSet::normalize(EntityQueryParams {
            dataset: strings(&["a", "b"]),
            typology: strings(&["geography", "geography"]),
            limit: 10,
            ..Default::default()
        });
        assert_eq!(compile(&a, QueryKind::Rows), compile(&b, QueryKind::Rows));
        assert_eq!(compile(&a, QueryKind::Count), compile(&b, QueryKind::Count));
    }

    #[test]
    fn test_named_params() {
        let query = CompiledQuery::new("x = :p0 AND y = :p1", strings(&["a", "b"]), false);
        let named: Vec<(String, &str)> = query.named_params().collect();
        assert_eq!(named, vec![("p0".to_string(), "a"), ("p1".to_string(), "b")]);
    }

    #[test]
    fn test_compile_dataset_counts() {
        let all = compile_dataset_counts(None);
        assert_eq!(
            all.sql,
            "SELECT dataset, COUNT(DISTINCT entity) AS _count FROM entity \
             GROUP BY dataset ORDER BY dataset"
        );
        assert!(all.params.is_empty());

        let one = compile_dataset_counts(Some("tree"));
        assert_eq!(
            one.sql,
            "SELECT dataset, COUNT(DISTINCT entity) AS _count FROM entity \
             WHERE dataset = :p0 GROUP BY dataset ORDER BY dataset"
        );
        assert_eq!(one.params, vec!["tree"]);
    }
}
