//! API route definitions
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub mod acl;
pub mod health;

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "acl", description = "Object permission management endpoints"),
        (name = "health", description = "Service health"),
    ),
)]
struct ApiDoc;

pub fn router() -> OpenApiRouter<crate::AppState> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::health_check))
        .routes(routes!(acl::list_acl, acl::grant_acl, acl::revoke_acl))
        .routes(routes!(acl::check_acl))
}
