//! Entity filter system
//!
//! Normalizes raw entity query parameters into a `FilterSet` and builds the
//! boolean SQL fragments for each filter concern.
//!
//! ## Usage
//!
//! ```no_run
//! use entity_search::data::entity::filters::{
//!     EntityQueryParams, FilterSet, SqlParams, build_membership_filter,
//! };
//!
//! let raw = EntityQueryParams {
//!     dataset: vec!["tree".into(), "conservation-area".into()],
//!     limit: 10,
//!     ..Default::default()
//! };
//! let filters = FilterSet::normalize(raw);
//! let mut params = SqlParams::default();
//! let sql = build_membership_filter(&filters, &mut params);
//! ```

mod builder;
mod normalize;
mod types;

pub use builder::{
    build_curie_filter, build_lifecycle_filter, build_membership_filter, build_spatial_filter,
    build_temporal_filter, point_wkt, resolve_date,
};
pub use types::{
    DateColumn, DateFilter, DateMatch, EntityQueryParams, EntriesOption, FilterSet,
    GeometryRelation, SqlParams,
};
