// Registration, login, token refresh and current-user endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel_async::AsyncConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{Company, NewUser, User, UserRole};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub company_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Register the first user of a company. The company is looked up by name
/// and created with defaults when absent; the registering user is its admin.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;

    let mut conn = state.conn().await?;

    let (company, user) = conn
        .transaction::<_, ApiError, _>(|tx| {
            Box::pin(async move {
                if User::find_by_email(tx, &payload.email).await?.is_some() {
                    return Err(ApiError::Conflict(
                        "A user with this email already exists".to_string(),
                    ));
                }

                let company = Company::find_or_create(tx, &payload.company_name).await?;
                let user = User::create(
                    tx,
                    NewUser {
                        company_id: company.id,
                        email: payload.email.to_lowercase(),
                        password_hash,
                        role: UserRole::Admin.as_str().to_string(),
                    },
                )
                .await?;

                Ok((company, user))
            })
        })
        .await?;

    let tokens = state
        .jwt_service
        .issue_token_pair(&user)
        .map_err(ApiError::internal)?;

    info!(user_id = %user.id, company_id = %company.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": tokens.token,
            "refresh_token": tokens.refresh_token,
            "user": user,
            "company": company,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let mut conn = state.conn().await?;

    let user = User::find_by_email(&mut conn, &payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is inactive".to_string()));
    }

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let tokens = state
        .jwt_service
        .issue_token_pair(&user)
        .map_err(ApiError::internal)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({
        "token": tokens.token,
        "refresh_token": tokens.refresh_token,
        "user": user,
    })))
}

/// Exchange a refresh token for a fresh access/refresh pair. Claims are
/// re-read from the database so a deactivated user cannot refresh.
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let mut conn = state.conn().await?;
    let user = User::find_by_id(&mut conn, claims.sub)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is inactive".to_string()));
    }

    let tokens = state
        .jwt_service
        .issue_token_pair(&user)
        .map_err(ApiError::internal)?;

    Ok(Json(json!({
        "token": tokens.token,
        "refresh_token": tokens.refresh_token,
    })))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.conn().await?;
    let user = User::find_by_id(&mut conn, auth.user_id).await?;
    let company = Company::find_by_id(&mut conn, auth.company_id).await?;

    Ok(Json(json!({
        "user": user,
        "company": company,
    })))
}
