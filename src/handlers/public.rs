// Public endpoints authenticated by the X-API-Key header: the lead
// capture form and the inbound email webhook.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::app::AppState;
use crate::middleware::ApiKeyCompany;
use crate::services::intake::{receive_email, InboundEmail};
use crate::services::leads::{capture_lead, LeadCapture};
use crate::services::Task;
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct PublicLeadRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub preferred_language: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WebhookEmailRequest {
    #[validate(email)]
    pub from_email: String,
    #[validate(length(min = 1, max = 500))]
    pub subject: String,
    pub body: String,
}

/// Website form submission. The lead auto-reply, when configured, is
/// rendered inline and returned so the form can show it immediately.
pub async fn submit_lead(
    State(state): State<AppState>,
    ApiKeyCompany(company): ApiKeyCompany,
    Json(payload): Json<PublicLeadRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let mut conn = state.conn().await?;
    let (lead, auto_reply) = capture_lead(
        &mut conn,
        Some(&company),
        LeadCapture {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            message: payload.message,
            source: payload.source.or_else(|| Some("website".to_string())),
            preferred_language: payload.preferred_language,
            ..Default::default()
        },
        None,
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

/// Inbound email webhook. Reply generation is deferred to the task
/// runner, enqueued only after the email row is committed.
pub async fn webhook_email(
    State(state): State<AppState>,
    ApiKeyCompany(company): ApiKeyCompany,
    Json(payload): Json<WebhookEmailRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let mut conn = state.conn().await?;
    let (email, company_id) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: payload.from_email,
            subject: payload.subject,
            body: payload.body,
            company_id: Some(company.id),
        },
    )
    .await?;

    state
        .task_queue
        .enqueue(Task::GenerateEmailReply { email_id: email.id });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "email": email,
            "company_id": company_id,
        })),
    ))
}
