// Bearer-token middleware for protected routes.
// Validates the JWT and injects AuthenticatedUser into request extensions.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::utils::ApiError;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return ApiError::Unauthorized("Missing or invalid authorization header".to_string())
                .into_response();
        },
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthenticatedUser {
                user_id: claims.sub,
                company_id: claims.company_id,
                email: claims.email,
                role: claims.role,
            });
            next.run(request).await
        },
        Err(e) => {
            warn!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
        },
    }
}

/// Lets handlers take AuthenticatedUser directly as an extractor
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}
