// Unified API error type.
//
// Maps the error taxonomy onto HTTP statuses. Unexpected errors never
// leak internal detail to the caller: they are logged with a generated
// correlation id and the response carries only that id.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        ApiError::Internal(e.to_string())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => ApiError::NotFound("Resource not found".to_string()),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => ApiError::Conflict(info.message().to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        match self {
            ApiError::Internal(detail) => {
                let correlation_id = Uuid::new_v4();
                error!(correlation_id = %correlation_id, "Internal error: {}", detail);
                (
                    status,
                    Json(json!({
                        "error": code,
                        "message": "An unexpected error occurred",
                        "correlation_id": correlation_id,
                    })),
                )
                    .into_response()
            },
            ApiError::RateLimited {
                retry_after_seconds,
            } => (
                status,
                [("Retry-After", retry_after_seconds.to_string())],
                Json(json!({
                    "error": code,
                    "message": "Rate limit exceeded",
                    "retry_after_seconds": retry_after_seconds,
                })),
            )
                .into_response(),
            other => (
                status,
                Json(json!({
                    "error": code,
                    "message": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("no token".into())
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("Lead").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::RateLimited {
                retry_after_seconds: 60
            }
            .into_response()
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_diesel_not_found_maps_to_404() {
        let err: ApiError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_internal_hides_detail() {
        let response = ApiError::Internal("secret database detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
