//! Filter type definitions
//!
//! Raw query parameters as they arrive from the HTTP layer, the normalized
//! `FilterSet` the predicate builders consume, and the option enums shared by
//! both.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, validate_limit};

/// Which lifecycle states to include
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntriesOption {
    #[default]
    All,
    Current,
    Historical,
}

/// How a resolved date is compared against its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateMatch {
    #[serde(alias = "match")]
    Exact,
    Before,
    Since,
    Empty,
}

impl DateMatch {
    /// Comparison operator, `None` for `Empty`
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Self::Exact => Some("="),
            Self::Before => Some("<"),
            Self::Since => Some(">="),
            Self::Empty => None,
        }
    }
}

/// Spatial relation between an entity geometry and a candidate geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GeometryRelation {
    #[default]
    Within,
    Intersects,
    Contains,
    Touches,
    Crosses,
    Overlaps,
    Equals,
    Disjoint,
}

impl GeometryRelation {
    /// SpatiaLite function implementing the relation
    pub fn sql_function(&self) -> &'static str {
        match self {
            Self::Within => "WITHIN",
            Self::Intersects => "INTERSECTS",
            Self::Contains => "CONTAINS",
            Self::Touches => "TOUCHES",
            Self::Crosses => "CROSSES",
            Self::Overlaps => "OVERLAPS",
            Self::Equals => "EQUALS",
            Self::Disjoint => "DISJOINT",
        }
    }
}

/// Date columns that accept range filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateColumn {
    StartDate,
    EndDate,
    EntryDate,
}

impl DateColumn {
    /// Fixed compile order
    pub const ALL: [DateColumn; 3] = [Self::StartDate, Self::EndDate, Self::EntryDate];

    pub fn column(&self) -> &'static str {
        match self {
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::EntryDate => "entry_date",
        }
    }
}

/// Borrowed view of one date column's filter parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter<'a> {
    pub date: Option<&'a str>,
    pub year: Option<&'a str>,
    pub month: Option<&'a str>,
    pub day: Option<&'a str>,
    pub matching: Option<DateMatch>,
}

/// Raw entity query parameters.
///
/// Every field is optional. Repeated keys (`dataset=a&dataset=b`) fill the
/// list fields. Date parts and coordinates stay strings so malformed values
/// can be skipped instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EntityQueryParams {
    #[serde(default)]
    pub typology: Vec<String>,
    #[serde(default)]
    pub dataset: Vec<String>,
    #[serde(default)]
    pub entity: Vec<String>,
    #[serde(default)]
    pub prefix: Vec<String>,
    #[serde(default)]
    pub reference: Vec<String>,
    #[serde(default)]
    pub curie: Vec<String>,

    pub entries: Option<EntriesOption>,

    pub entry_start_date: Option<String>,
    pub entry_start_date_year: Option<String>,
    pub entry_start_date_month: Option<String>,
    pub entry_start_date_day: Option<String>,
    pub entry_start_date_match: Option<DateMatch>,

    pub entry_end_date: Option<String>,
    pub entry_end_date_year: Option<String>,
    pub entry_end_date_month: Option<String>,
    pub entry_end_date_day: Option<String>,
    pub entry_end_date_match: Option<DateMatch>,

    pub entry_entry_date: Option<String>,
    pub entry_entry_date_year: Option<String>,
    pub entry_entry_date_month: Option<String>,
    pub entry_entry_date_day: Option<String>,
    pub entry_entry_date_match: Option<DateMatch>,

    pub longitude: Option<String>,
    pub latitude: Option<String>,
    #[serde(default)]
    pub geometry: Vec<String>,
    #[serde(default)]
    pub geometry_entity: Vec<String>,
    #[serde(default)]
    pub geometry_reference: Vec<String>,
    pub geometry_match: Option<GeometryRelation>,

    pub next_entity: Option<String>,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}

/// Normalized filter set.
///
/// Produced by [`FilterSet::normalize`]; absent values are `None`/empty and
/// are left out of the serialized form. Membership lists are sorted and
/// deduplicated so equal filter sets compile to identical SQL.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FilterSet {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub typology: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dataset: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entity: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub curie: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<EntriesOption>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_start_date_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_start_date_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_start_date_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_start_date_match: Option<DateMatch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_end_date_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_end_date_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_end_date_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_end_date_match: Option<DateMatch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_entry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_entry_date_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_entry_date_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_entry_date_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_entry_date_match: Option<DateMatch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geometry_entity: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geometry_reference: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_match: Option<GeometryRelation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_entity: Option<String>,
    pub limit: u32,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            typology: Vec::new(),
            dataset: Vec::new(),
            entity: Vec::new(),
            prefix: Vec::new(),
            reference: Vec::new(),
            curie: Vec::new(),
            entries: None,
            entry_start_date: None,
            entry_start_date_year: None,
            entry_start_date_month: None,
            entry_start_date_day: None,
            entry_start_date_match: None,
            entry_end_date: None,
            entry_end_date_year: None,
            entry_end_date_month: None,
            entry_end_date_day: None,
            entry_end_date_match: None,
            entry_entry_date: None,
            entry_entry_date_year: None,
            entry_entry_date_month: None,
            entry_entry_date_day: None,
            entry_entry_date_match: None,
            longitude: None,
            latitude: None,
            geometry: Vec::new(),
            geometry_entity: Vec::new(),
            geometry_reference: Vec::new(),
            geometry_match: None,
            next_entity: None,
            limit: default_limit(),
        }
    }
}

impl FilterSet {
    /// Membership lists in compile order, paired with their column names
    pub fn membership(&self) -> [(&'static str, &[String]); 5] {
        [
            ("typology", self.typology.as_slice()),
            ("dataset", self.dataset.as_slice()),
            ("entity", self.entity.as_slice()),
            ("prefix", self.prefix.as_slice()),
            ("reference", self.reference.as_slice()),
        ]
    }

    /// Date filter parameters for one column
    pub fn date_filter(&self, column: DateColumn) -> DateFilter<'_> {
        let (date, year, month, day, matching) = match column {
            DateColumn::StartDate => (
                &self.entry_start_date,
                &self.entry_start_date_year,
                &self.entry_start_date_month,
                &self.entry_start_date_day,
                self.entry_start_date_match,
            ),
            DateColumn::EndDate => (
                &self.entry_end_date,
                &self.entry_end_date_year,
                &self.entry_end_date_month,
                &self.entry_end_date_day,
                self.entry_end_date_match,
            ),
            DateColumn::EntryDate => (
                &self.entry_entry_date,
                &self.entry_entry_date_year,
                &self.entry_entry_date_month,
                &self.entry_entry_date_day,
                self.entry_entry_date_match,
            ),
        };
        DateFilter {
            date: date.as_deref(),
            year: year.as_deref(),
            month: month.as_deref(),
            day: day.as_deref(),
            matching,
        }
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<String>,
}

impl SqlParams {
    /// Record a value and return its named placeholder (`:p0`, `:p1`, ...)
    pub fn bind(&mut self, value: impl Into<String>) -> String {
        let placeholder = format!(":p{}", self.values.len());
        self.values.push(value.into());
        placeholder
    }
}
