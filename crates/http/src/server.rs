//! Router assembly.

use crate::identity::identity_middleware;
use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router plus its OpenAPI document.
///
/// The identity middleware runs on every route except the ones the provider
/// skips; handlers pull the established [`CurrentUser`](crate::identity::CurrentUser)
/// out of request extensions.
pub fn build_router(state: AppState) -> (Router, utoipa::openapi::OpenApi) {
    let (router, api) = crate::routes::router().split_for_parts();

    let router = router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    (router, api)
}
