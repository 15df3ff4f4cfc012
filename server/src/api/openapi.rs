//! OpenAPI specification

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{entity, health};
use crate::data::entity::filters::{DateMatch, EntriesOption, FilterSet, GeometryRelation};
use crate::data::entity::{
    DatasetEntityCount, EntityCountResponse, EntityRecord, EntitySearchResponse, SqlPreview,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Entity Search API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Read-only entity search over a Datasette endpoint"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "entity", description = "Entity search and lookup"),
        (name = "datasets", description = "Per-dataset statistics")
    ),
    paths(
        health::health,
        entity::search_entities,
        entity::count_entities,
        entity::entity_sql,
        entity::get_entity,
        entity::dataset_entity_counts,
    ),
    components(schemas(
        health::HealthResponse,
        entity::DatasetCountsQuery,
        FilterSet,
        EntriesOption,
        DateMatch,
        GeometryRelation,
        EntityRecord,
        EntitySearchResponse,
        EntityCountResponse,
        SqlPreview,
        DatasetEntityCount,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
