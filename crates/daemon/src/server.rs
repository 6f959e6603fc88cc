//! Backend selection and server assembly.

use crate::config::Settings;
use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa_swagger_ui::SwaggerUi;
use warden_http::{AppState, HeaderIdentityProvider, build_router};

/// Connect the storage backend named by the database URL scheme and wire up
/// application state. The same backend serves as grant store and directory.
pub async fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let url = &settings.database.url;

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let backend = Arc::new(
            warden_sqlx::PostgresBackend::new(url)
                .await
                .context("Failed to open postgres backend")?,
        );
        Ok(AppState::new(
            backend.clone(),
            backend.clone(),
            Arc::new(HeaderIdentityProvider::new(backend)),
        ))
    } else {
        let backend = Arc::new(
            warden_sqlx::SqliteBackend::new(url)
                .await
                .context("Failed to open sqlite backend")?,
        );
        Ok(AppState::new(
            backend.clone(),
            backend.clone(),
            Arc::new(HeaderIdentityProvider::new(backend)),
        ))
    }
}

/// Assemble the router with API docs mounted.
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let (router, api) = build_router(state);
    let mut router =
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api));

    if !cors_origins.is_empty() {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        router = router.layer(CorsLayer::new().allow_origin(origins));
    }

    router
}

/// Run the server until interrupted.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let state = build_state(&settings).await?;
    let app = build_app(state, &settings.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_addr()))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}
