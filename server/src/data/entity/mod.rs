//! Entity search engine
//!
//! Normalized filters are compiled into parameterized SQL over the `entity`
//! and `geometry` tables, executed through a `QueryBackend`, and mapped into
//! allow-listed records.

pub mod filters;
mod mapper;
mod query;
mod repository;

pub use mapper::{DatasetEntityCount, EntityField, EntityRecord, map_count, map_rows};
pub use query::{COUNT_COLUMN, CompiledQuery, QueryKind, compile, compile_dataset_counts};
pub use repository::{EntityCountResponse, EntityRepository, EntitySearchResponse, SqlPreview};

#[cfg(test)]
pub(crate) use repository::tests::{MemoryBackend, brownfield_backend};
