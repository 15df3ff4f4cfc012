//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::openapi::openapi_json;
use super::routes::{entity, health};
use crate::core::CoreApp;
use crate::data::entity::EntityRepository;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Full application router for a repository
    pub fn router(repository: EntityRepository) -> Router {
        let api_routes = entity::routes(repository.clone()).merge(health::routes(repository));

        Router::new()
            .route("/api/openapi.json", get(openapi_json))
            .nest("/api/v1", api_routes)
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(middleware::cors())
            .layer(TraceLayer::new_for_http())
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        let router = Self::router(app.repository.clone());

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP listener bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
