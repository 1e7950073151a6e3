// Authenticated lead CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{Company, Lead, LeadUpdate};
use crate::services::leads::{capture_lead, LeadCapture};
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
}

pub async fn list_leads(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Lead>>, ApiError> {
    let mut conn = state.conn().await?;
    let leads = Lead::list_for_company(&mut conn, auth.company_id).await?;
    Ok(Json(leads))
}

pub async fn create_lead(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let mut conn = state.conn().await?;
    let company = Company::find_by_id(&mut conn, auth.company_id).await?;

    let (lead, auto_reply) = capture_lead(
        &mut conn,
        Some(&company),
        LeadCapture {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            message: payload.message,
            source: payload.source.or_else(|| Some("api".to_string())),
            tags: payload.tags,
            ..Default::default()
        },
        Some(auth.user_id),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "lead": lead,
            "auto_reply": auto_reply,
        })),
    ))
}

pub async fn update_lead(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>, ApiError> {
    if let Some(status) = &payload.status {
        status
            .parse::<crate::models::LeadStatus>()
            .map_err(ApiError::Validation)?;
    }

    let mut conn = state.conn().await?;

    // Cross-company ids behave like missing rows
    Lead::find_for_company(&mut conn, lead_id, auth.company_id)
        .await
        .map_err(|_| ApiError::not_found("Lead"))?;

    let lead = Lead::update(
        &mut conn,
        lead_id,
        LeadUpdate {
            name: payload.name,
            phone: payload.phone,
            message: payload.message,
            source: payload.source,
            tags: payload.tags,
            status: payload.status,
        },
    )
    .await?;

    Ok(Json(lead))
}
