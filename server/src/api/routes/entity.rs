//! Entity search API endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{EntityPath, ValidatedQuery};
use crate::api::types::ApiError;
use crate::data::entity::filters::{EntityQueryParams, FilterSet};
use crate::data::entity::{
    DatasetEntityCount, EntityCountResponse, EntityRecord, EntityRepository, EntitySearchResponse,
    SqlPreview,
};

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct DatasetCountsQuery {
    #[validate(length(min = 1, max = 256))]
    pub dataset: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(repository: EntityRepository) -> Router<()> {
    Router::new()
        .route("/entity", get(search_entities))
        .route("/entity/count", get(count_entities))
        .route("/entity/sql", get(entity_sql))
        .route("/entity/{entity}", get(get_entity))
        .route("/datasets/entity-counts", get(dataset_entity_counts))
        .with_state(repository)
}

// ============================================================================
// Handlers
// ============================================================================

/// Search entities
///
/// Accepts repeated `typology`, `dataset`, `entity`, `prefix`, `reference`,
/// `curie`, `geometry`, `geometry_entity` and `geometry_reference` keys plus
/// the lifecycle, date, point, cursor and limit parameters.
#[utoipa::path(
    get,
    path = "/api/v1/entity",
    tag = "entity",
    responses(
        (status = 200, description = "Matching entities", body = EntitySearchResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 502, description = "Remote query failed"),
        (status = 504, description = "Remote query timed out")
    )
)]
pub async fn search_entities(
    State(repository): State<EntityRepository>,
    ValidatedQuery(params): ValidatedQuery<EntityQueryParams>,
) -> Result<Json<EntitySearchResponse>, ApiError> {
    let filters = FilterSet::from(params);
    let response = repository.search(&filters).await?;
    Ok(Json(response))
}

/// Count entities matching the filters
#[utoipa::path(
    get,
    path = "/api/v1/entity/count",
    tag = "entity",
    responses(
        (status = 200, description = "Match count", body = EntityCountResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 502, description = "Remote query failed"),
        (status = 504, description = "Remote query timed out")
    )
)]
pub async fn count_entities(
    State(repository): State<EntityRepository>,
    ValidatedQuery(params): ValidatedQuery<EntityQueryParams>,
) -> Result<Json<EntityCountResponse>, ApiError> {
    let filters = FilterSet::from(params);
    let count = repository.count(&filters).await?;
    Ok(Json(EntityCountResponse {
        query: filters,
        count,
    }))
}

/// Show the SQL a search would run, without running it
#[utoipa::path(
    get,
    path = "/api/v1/entity/sql",
    tag = "entity",
    responses(
        (status = 200, description = "Compiled queries", body = SqlPreview),
        (status = 400, description = "Invalid query parameters")
    )
)]
pub async fn entity_sql(
    State(repository): State<EntityRepository>,
    ValidatedQuery(params): ValidatedQuery<EntityQueryParams>,
) -> Json<SqlPreview> {
    Json(repository.preview(&FilterSet::from(params)))
}

/// Get a single entity
#[utoipa::path(
    get,
    path = "/api/v1/entity/{entity}",
    tag = "entity",
    params(("entity" = String, Path, description = "Entity number")),
    responses(
        (status = 200, description = "Entity", body = EntityRecord),
        (status = 404, description = "Entity not found"),
        (status = 502, description = "Remote query failed")
    )
)]
pub async fn get_entity(
    State(repository): State<EntityRepository>,
    EntityPath(entity): EntityPath,
) -> Result<Json<EntityRecord>, ApiError> {
    repository
        .get_entity(&entity)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found("ENTITY_NOT_FOUND", format!("Entity not found: {}", entity))
        })
}

/// Entity counts per dataset
#[utoipa::path(
    get,
    path = "/api/v1/datasets/entity-counts",
    tag = "datasets",
    params(("dataset" = Option<String>, Query, description = "Restrict to one dataset")),
    responses(
        (status = 200, description = "Counts per dataset", body = Vec<DatasetEntityCount>),
        (status = 502, description = "Remote query failed")
    )
)]
pub async fn dataset_entity_counts(
    State(repository): State<EntityRepository>,
    ValidatedQuery(query): ValidatedQuery<DatasetCountsQuery>,
) -> Result<Json<Vec<DatasetEntityCount>>, ApiError> {
    let counts = repository.dataset_counts(query.dataset.as_deref()).await?;
    Ok(Json(counts))
}
