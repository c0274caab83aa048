//! API error types for the authorization management surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use fleetgrid_authorization::AuthorizationError;

/// Errors returned by the authorization API endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Authentication required.
    #[error("Authentication required")]
    Unauthorized,

    /// The caller lacks the capability governing this operation.
    #[error("Access denied")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate resource conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Authorization engine error.
    #[error(transparent)]
    Engine(#[from] AuthorizationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, count) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone(), None),
            Self::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.clone(), None),
            Self::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.clone(), None),
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Internal server error".to_string(),
                None,
            ),
            Self::Engine(e) => match e {
                AuthorizationError::CapabilityNotFound(_)
                | AuthorizationError::RoleNotFound(_)
                | AuthorizationError::TemplateNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found", e.to_string(), None)
                }
                AuthorizationError::InvalidAccessLevel { .. } => (
                    StatusCode::BAD_REQUEST,
                    "invalid_access_level",
                    e.to_string(),
                    None,
                ),
                AuthorizationError::RoleInUse(n) => {
                    (StatusCode::CONFLICT, "role_in_use", e.to_string(), Some(*n))
                }
                AuthorizationError::Validation(m) => (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    m.clone(),
                    None,
                ),
                AuthorizationError::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Internal server error".to_string(),
                    None,
                ),
            },
        };

        let body = match count {
            Some(n) => json!({ "error": error_code, "message": message, "count": n }),
            None => json!({ "error": error_code, "message": message }),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for authorization API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
