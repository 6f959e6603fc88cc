//! Identity establishment for the API layer.
//!
//! Authentication itself is the host application's concern; this module only
//! defines how an already-authenticated identity reaches the handlers, plus
//! a trusted-header provider for deployments behind an authenticating proxy.

use crate::error::HttpError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use warden_core::{Directory, Identity};

/// Header carrying the already-authenticated user id.
pub const USER_ID_HEADER: &str = "x-warden-user";

/// The acting user, inserted as a request extension by
/// [`identity_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            HttpError::AuthenticationFailed("No identity established".to_string())
        })
    }
}

/// Trait for identity providers
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Establish the acting user from request parts.
    async fn identify(&self, parts: &Parts) -> Result<CurrentUser, HttpError>;

    /// Check if identity establishment should be skipped for a given path
    fn should_skip(&self, path: &str) -> bool {
        path == "/health" || path.starts_with("/swagger-ui") || path.starts_with("/api-docs")
    }
}

/// Provider trusting a proxy-set user id header, resolved through the
/// Directory.
pub struct HeaderIdentityProvider {
    directory: Arc<dyn Directory>,
}

impl HeaderIdentityProvider {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn identify(&self, parts: &Parts) -> Result<CurrentUser, HttpError> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                HttpError::AuthenticationFailed(format!("Missing {USER_ID_HEADER} header"))
            })?;

        let identity = self
            .directory
            .load_identity(user_id)
            .await
            .map_err(|e| HttpError::InternalServerError(e.to_string()))?
            .ok_or_else(|| {
                HttpError::AuthenticationFailed(format!("Unknown user: {user_id}"))
            })?;

        Ok(CurrentUser(identity))
    }
}

/// Middleware function for identity establishment
pub async fn identity_middleware(
    State(app_state): State<crate::AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let path = req.uri().path();

    if app_state.identity.should_skip(path) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    match app_state.identity.identify(&parts).await {
        Ok(user) => {
            parts.extensions.insert(user);
            let req = Request::from_parts(parts, body);
            Ok(next.run(req).await)
        }
        Err(e) => Err(e),
    }
}
