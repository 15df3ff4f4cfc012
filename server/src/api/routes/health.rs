//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::entity::EntityRepository;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Name of the query backend entity searches run against
    pub backend: &'static str,
}

pub fn routes(repository: EntityRepository) -> Router<()> {
    Router::new()
        .route("/health", get(health))
        .with_state(repository)
}

/// Health check endpoint
///
/// Does not contact the query backend.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(repository): State<EntityRepository>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            backend: repository.backend_name(),
        }),
    )
}
