//! HTTP error types and implementations

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-specific errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Authorization failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            HttpError::AuthenticationFailed(_) => {
                (StatusCode::UNAUTHORIZED, "authentication_failed")
            }
            HttpError::AuthorizationFailed(_) => (StatusCode::FORBIDDEN, "authorization_failed"),
            HttpError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            HttpError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            HttpError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<warden_core::Error> for HttpError {
    fn from(err: warden_core::Error) -> Self {
        use warden_core::Error;
        match err {
            // Client supplied an access type outside the closed set.
            Error::InvalidAccessType(_) => HttpError::BadRequest(err.to_string()),
            // Resolution failures are always "no such resource visible to
            // this caller", deliberately indistinguishable from rows in
            // another organization.
            Error::UnknownObjectType(_)
            | Error::UnknownGranteeType(_)
            | Error::ObjectNotFound { .. }
            | Error::GranteeNotFound { .. } => HttpError::NotFound(err.to_string()),
            Error::StateError(_) | Error::SerializationError(_) | Error::Internal(_) => {
                HttpError::InternalServerError(err.to_string())
            }
        }
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Error, GranteeKind, ObjectKind};

    #[test]
    fn invalid_access_type_maps_to_bad_request() {
        let err: HttpError = Error::InvalidAccessType("execute".to_string()).into();
        assert!(matches!(err, HttpError::BadRequest(_)));
    }

    #[test]
    fn resolution_failures_map_to_not_found() {
        for err in [
            Error::UnknownObjectType("alerts".to_string()),
            Error::ObjectNotFound {
                kind: ObjectKind::Queries,
                id: "q1".to_string(),
            },
            Error::GranteeNotFound {
                kind: GranteeKind::Groups,
                id: "g1".to_string(),
            },
        ] {
            let http: HttpError = err.into();
            assert!(matches!(http, HttpError::NotFound(_)));
        }
    }

    #[test]
    fn storage_failures_map_to_internal_error() {
        let err: HttpError = Error::StateError("connection refused".to_string()).into();
        assert!(matches!(err, HttpError::InternalServerError(_)));
    }
}
