// User administration: role changes (admin) and self-service password change.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{User, UserRole};
use crate::services::activity::{log_activity, ActivityEntry};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::ApiError;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

fn require_admin(auth: &AuthenticatedUser) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "User management requires the admin role".to_string(),
        ))
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<User>>, ApiError> {
    require_admin(&auth)?;

    let mut conn = state.conn().await?;
    let users = User::list_for_company(&mut conn, auth.company_id).await?;
    Ok(Json(users))
}

/// Change another user's role within the caller's company
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<User>, ApiError> {
    require_admin(&auth)?;

    let new_role = payload
        .role
        .parse::<UserRole>()
        .map_err(ApiError::Validation)?;

    let mut conn = state.conn().await?;
    let user = User::update_role(&mut conn, user_id, auth.company_id, new_role)
        .await
        .map_err(|_| ApiError::not_found("User"))?;

    log_activity(
        &mut conn,
        ActivityEntry {
            action: "user_role_updated",
            entity_type: "user",
            entity_id: Some(user.id),
            company_id: auth.company_id,
            user_id: Some(auth.user_id),
            description: Some(&format!("role set to {}", user.role)),
        },
    )
    .await?;

    Ok(Json(user))
}

/// Change the caller's own password after verifying the current one
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<User>, ApiError> {
    payload.validate()?;

    let mut conn = state.conn().await?;
    let user = User::find_by_id(&mut conn, auth.user_id).await?;

    if !verify_password(&payload.current_password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = hash_password(&payload.new_password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;
    let user = User::update_password(&mut conn, user.id, &new_hash).await?;

    log_activity(
        &mut conn,
        ActivityEntry {
            action: "password_changed",
            entity_type: "user",
            entity_id: Some(user.id),
            company_id: auth.company_id,
            user_id: Some(auth.user_id),
            description: None,
        },
    )
    .await?;

    Ok(Json(user))
}
