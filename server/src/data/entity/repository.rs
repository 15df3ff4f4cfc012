//! Entity repository
//!
//! Runs compiled entity queries through a `QueryBackend` and assembles the
//! response models. Count and row queries are issued one after the other with
//! no transaction between them.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::filters::FilterSet;
use super::mapper::{DatasetEntityCount, EntityRecord, map_count, map_dataset_counts, map_rows};
use super::query::{COUNT_COLUMN, CompiledQuery, QueryKind, compile, compile_dataset_counts};
use crate::data::error::DataError;
use crate::data::traits::{QueryBackend, QueryResult};

/// Search response envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntitySearchResponse {
    /// Normalized filters the results were selected with
    pub query: FilterSet,
    /// Total matches, ignoring pagination
    pub count: u64,
    pub results: Vec<EntityRecord>,
}

/// Count-only response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntityCountResponse {
    pub query: FilterSet,
    pub count: u64,
}

/// Compiled SQL for a filter set, without executing it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SqlPreview {
    /// Row query with named placeholders
    pub sql: String,
    pub params: Vec<String>,
    /// Row query with sanitized literals in place of placeholders
    pub inline_sql: String,
    /// Count query with sanitized literals
    pub count_sql: String,
}

/// Entity query executor
#[derive(Clone)]
pub struct EntityRepository {
    backend: Arc<dyn QueryBackend>,
}

impl EntityRepository {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn run(&self, query: &CompiledQuery) -> Result<QueryResult, DataError> {
        tracing::debug!(
            backend = self.backend.name(),
            count_only = query.count_only,
            sql = %query.sql,
            params = ?query.params,
            "Executing entity query"
        );
        self.backend.execute(query).await
    }

    /// Count plus one page of matching entities
    pub async fn search(&self, filters: &FilterSet) -> Result<EntitySearchResponse, DataError> {
        let count = self.count(filters).await?;

        let rows = self.run(&compile(filters, QueryKind::Rows)).await?;
        let results = map_rows(&rows)?;

        tracing::debug!(count, returned = results.len(), "Entity search complete");

        Ok(EntitySearchResponse {
            query: filters.clone(),
            count,
            results,
        })
    }

    /// Total number of entities matching the filters
    pub async fn count(&self, filters: &FilterSet) -> Result<u64, DataError> {
        let result = self.run(&compile(filters, QueryKind::Count)).await?;
        map_count(&result, COUNT_COLUMN)
    }

    /// Look up a single entity by its number
    pub async fn get_entity(&self, entity: &str) -> Result<Option<EntityRecord>, DataError> {
        let filters = FilterSet {
            entity: vec![entity.to_string()],
            limit: 1,
            ..Default::default()
        };
        let rows = self.run(&compile(&filters, QueryKind::Rows)).await?;
        Ok(map_rows(&rows)?.into_iter().next())
    }

    /// Entity counts per dataset
    pub async fn dataset_counts(
        &self,
        dataset: Option<&str>,
    ) -> Result<Vec<DatasetEntityCount>, DataError> {
        let result = self.run(&compile_dataset_counts(dataset)).await?;
        map_dataset_counts(&result, COUNT_COLUMN)
    }

    /// SQL that `search` would run for these filters
    pub fn preview(&self, filters: &FilterSet) -> SqlPreview {
        let rows = compile(filters, QueryKind::Rows);
        let count = compile(filters, QueryKind::Count);
        SqlPreview {
            inline_sql: rows.to_inline_sql(),
            count_sql: count.to_inline_sql(),
            sql: rows.sql,
            params: rows.params,
        }
    }
}
