//! SQL predicate builders
//!
//! Each builder turns one concern of a `FilterSet` into an optional boolean
//! fragment over the `entity`/`geometry` join. `None` means the concern adds
//! nothing, either because it is absent or because its values were malformed.
//! User values are always bound through `SqlParams`.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::types::{DateColumn, DateFilter, EntriesOption, FilterSet, SqlParams};

/// Membership lists: `(entity.col = v OR ...)` per column, joined with AND
pub fn build_membership_filter(filters: &FilterSet, params: &mut SqlParams) -> Option<String> {
    let clauses: Vec<String> = filters
        .membership()
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(column, values)| {
            let conditions: Vec<String> = values
                .iter()
                .map(|v| format!("entity.{} = {}", column, params.bind(v.as_str())))
                .collect();
            format!("({})", conditions.join(" OR "))
        })
        .collect();

    join_and(clauses)
}

/// Curie pairs: `((entity.prefix = p AND entity.reference = r) OR ...)`
pub fn build_curie_filter(filters: &FilterSet, params: &mut SqlParams) -> Option<String> {
    if filters.curie.is_empty() {
        return None;
    }

    let conditions: Vec<String> = filters
        .curie
        .iter()
        .map(|curie| {
            let mut parts = curie.split(':');
            let prefix = parts.next().unwrap_or("");
            let reference = parts.next().unwrap_or("");
            format!(
                "(entity.prefix = {} AND entity.reference = {})",
                params.bind(prefix),
                params.bind(reference)
            )
        })
        .collect();

    Some(format!("({})", conditions.join(" OR ")))
}

/// Lifecycle state from `end_date`
pub fn build_lifecycle_filter(filters: &FilterSet) -> Option<String> {
    match filters.entries.unwrap_or_default() {
        EntriesOption::All => None,
        EntriesOption::Current => Some("entity.end_date is ''".to_string()),
        EntriesOption::Historical => Some("entity.end_date is not ''".to_string()),
    }
}

/// Resolve an ISO date from an explicit date or year/month/day parts.
///
/// An explicit date wins. Otherwise a positive year is required and month and
/// day default to 1. Anything non-numeric or off-calendar yields `None`.
pub fn resolve_date(filter: &DateFilter<'_>) -> Option<String> {
    if let Some(date) = filter.date {
        return NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .ok()
            .map(iso_date);
    }

    let year: i32 = filter.year?.trim().parse().ok()?;
    if year <= 0 {
        return None;
    }
    let month: u32 = filter.month.map_or(Some(1), |m| m.trim().parse().ok())?;
    let day: u32 = filter.day.map_or(Some(1), |d| d.trim().parse().ok())?;

    NaiveDate::from_ymd_opt(year, month, day).map(iso_date)
}

/// Zero-padded `YYYY-MM-DD`; years past 9999 print unsigned
fn iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Date range conditions on start_date, end_date and entry_date
pub fn build_temporal_filter(filters: &FilterSet, params: &mut SqlParams) -> Option<String> {
    let mut clauses = Vec::new();

    for column in DateColumn::ALL {
        let filter = filters.date_filter(column);
        let Some(matching) = filter.matching else {
            continue;
        };
        let col = column.column();

        match matching.operator() {
            None => {
                clauses.push(format!("entity.{} = ''", col));
            }
            Some(op) => {
                let Some(date) = resolve_date(&filter) else {
                    tracing::debug!(column = col, "Skipping unresolvable date filter");
                    continue;
                };
                clauses.push(format!(
                    "(entity.{col} != '' AND entity.{col} {op} {})",
                    params.bind(date)
                ));
            }
        }
    }

    join_and(clauses)
}

/// `POINT(lon lat)` with both coordinates rounded half-to-even to 6 decimal places
pub fn point_wkt(longitude: Option<&str>, latitude: Option<&str>) -> Option<String> {
    let lon = coordinate(longitude?)?;
    let lat = coordinate(latitude?)?;
    Some(format!("POINT({} {})", lon, lat))
}

fn coordinate(value: &str) -> Option<Decimal> {
    let value = value.trim();
    let mut decimal = value
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(value))
        .ok()?
        .round_dp(6);
    decimal.rescale(6);
    Some(decimal)
}

/// Spatial relation against every candidate geometry.
///
/// Candidates come from the point, `geometry` WKT values, `geometry_entity`
/// and `geometry_reference`, in that order. Each candidate is tested against
/// the polygon column (when present) and the point column.
pub fn build_spatial_filter(filters: &FilterSet, params: &mut SqlParams) -> Option<String> {
    let mut candidates = Vec::new();

    if let Some(point) = point_wkt(filters.longitude.as_deref(), filters.latitude.as_deref()) {
        candidates.push(format!("GeomFromText({})", params.bind(point)));
    }
    for wkt in &filters.geometry {
        candidates.push(format!("GeomFromText({})", params.bind(wkt.as_str())));
    }
    for entity in &filters.geometry_entity {
        candidates.push(format!(
            "(SELECT geometry_geom FROM geometry WHERE entity = {})",
            params.bind(entity.as_str())
        ));
    }
    for reference in &filters.geometry_reference {
        candidates.push(format!(
            "(SELECT geometry_geom FROM geometry WHERE entity = \
             (SELECT entity FROM entity WHERE reference = {} GROUP BY entity))",
            params.bind(reference.as_str())
        ));
    }

    if candidates.is_empty() {
        return None;
    }

    let func = filters.geometry_match.unwrap_or_default().sql_function();
    let tests: Vec<String> = candidates
        .iter()
        .map(|c| {
            format!(
                "((geometry.geometry_geom IS NOT NULL AND {func}(geometry.geometry_geom, {c})) \
                 OR {func}(geometry.point_geom, {c}))"
            )
        })
        .collect();

    Some(format!(
        "(entity.entity = geometry.entity AND ({}))",
        tests.join(" OR ")
    ))
}

fn join_and(clauses: Vec<String>) -> Option<String> {
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}
