// Auto-reply template CRUD (admin only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{AutoReplyTemplate, NewAutoReplyTemplate, TemplateUpdate, TriggerType};
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    #[validate(length(min = 1))]
    pub trigger_type: String,
    #[validate(length(min = 1, max = 500))]
    pub subject_template: String,
    #[validate(length(min = 1))]
    pub body_template: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub trigger_type: Option<String>,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
}

fn require_admin(auth: &AuthenticatedUser) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Template management requires the admin role".to_string(),
        ))
    }
}

fn validate_trigger(trigger: &str) -> Result<(), ApiError> {
    trigger
        .parse::<TriggerType>()
        .map(|_| ())
        .map_err(ApiError::Validation)
}

pub async fn list_templates(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<AutoReplyTemplate>>, ApiError> {
    let mut conn = state.conn().await?;
    let templates = AutoReplyTemplate::list_for_company(&mut conn, auth.company_id).await?;
    Ok(Json(templates))
}

pub async fn get_template(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
) -> Result<Json<AutoReplyTemplate>, ApiError> {
    let mut conn = state.conn().await?;
    let template = AutoReplyTemplate::find_for_company(&mut conn, template_id, auth.company_id)
        .await
        .map_err(|_| ApiError::not_found("Template"))?;
    Ok(Json(template))
}

pub async fn create_template(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<AutoReplyTemplate>), ApiError> {
    require_admin(&auth)?;
    payload.validate()?;
    validate_trigger(&payload.trigger_type)?;

    let mut conn = state.conn().await?;
    let template = AutoReplyTemplate::create(
        &mut conn,
        NewAutoReplyTemplate {
            company_id: Some(auth.company_id),
            name: payload.name,
            category: payload.category,
            tone: payload.tone,
            trigger_type: payload.trigger_type,
            subject_template: payload.subject_template,
            body_template: payload.body_template,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<Json<AutoReplyTemplate>, ApiError> {
    require_admin(&auth)?;
    if let Some(trigger) = &payload.trigger_type {
        validate_trigger(trigger)?;
    }

    let mut conn = state.conn().await?;

    AutoReplyTemplate::find_for_company(&mut conn, template_id, auth.company_id)
        .await
        .map_err(|_| ApiError::not_found("Template"))?;

    let template = AutoReplyTemplate::update(
        &mut conn,
        template_id,
        TemplateUpdate {
            name: payload.name,
            category: payload.category,
            tone: payload.tone,
            trigger_type: payload.trigger_type,
            subject_template: payload.subject_template,
            body_template: payload.body_template,
        },
    )
    .await?;

    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&auth)?;

    let mut conn = state.conn().await?;
    let deleted = AutoReplyTemplate::delete(&mut conn, template_id, auth.company_id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Template"));
    }
    Ok(StatusCode::NO_CONTENT)
}
