//! Liveness endpoint, exempt from identity establishment.

use axum::response::Json;
use serde::{Deserialize, Serialize};

/// Reported by [`health_check`]. Liveness only; storage reachability
/// surfaces through the ACL endpoints themselves.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    })
}
