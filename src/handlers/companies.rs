// Company settings endpoints.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{Company, CompanyUpdate};
use crate::services::activity::{log_activity, ActivityEntry};
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub auto_reply_enabled: Option<bool>,
    pub ai_model: Option<String>,
    pub ai_prompt_template: Option<String>,
}

fn require_admin(auth: &AuthenticatedUser) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Company settings require the admin role".to_string(),
        ))
    }
}

pub async fn get_company(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Company>, ApiError> {
    let mut conn = state.conn().await?;
    let company = Company::find_by_id(&mut conn, auth.company_id).await?;
    Ok(Json(company))
}

pub async fn update_company(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<Json<Company>, ApiError> {
    require_admin(&auth)?;
    payload.validate()?;

    let mut conn = state.conn().await?;
    let company = Company::update(
        &mut conn,
        auth.company_id,
        CompanyUpdate {
            name: payload.name,
            api_key: None,
            auto_reply_enabled: payload.auto_reply_enabled,
            ai_model: payload.ai_model,
            ai_prompt_template: payload.ai_prompt_template,
        },
    )
    .await?;

    log_activity(
        &mut conn,
        ActivityEntry {
            action: "company_updated",
            entity_type: "company",
            entity_id: Some(company.id),
            company_id: company.id,
            user_id: Some(auth.user_id),
            description: None,
        },
    )
    .await?;

    Ok(Json(company))
}

/// Rotate the API key. The new key is returned once, in this response only.
pub async fn rotate_api_key(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    require_admin(&auth)?;

    let mut conn = state.conn().await?;
    let company = Company::rotate_api_key(&mut conn, auth.company_id).await?;

    log_activity(
        &mut conn,
        ActivityEntry {
            action: "api_key_rotated",
            entity_type: "company",
            entity_id: Some(company.id),
            company_id: company.id,
            user_id: Some(auth.user_id),
            description: None,
        },
    )
    .await?;

    Ok(Json(json!({ "api_key": company.api_key })))
}
