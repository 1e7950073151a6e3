// Authenticated email endpoints: listing, manual intake, and the
// synchronous "generate reply" action.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{Company, EmailMessage, EmailReply};
use crate::services::classification::{analyze_email, EmailAnalysis};
use crate::services::intake::{receive_email, InboundEmail};
use crate::services::orchestrator::generate_email_reply;
use crate::services::Task;
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct ReceiveEmailRequest {
    #[validate(email)]
    pub from_email: String,
    #[validate(length(min = 1, max = 500))]
    pub subject: String,
    pub body: String,
}

pub async fn list_emails(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<EmailMessage>>, ApiError> {
    let mut conn = state.conn().await?;
    let emails = EmailMessage::list_for_company(&mut conn, auth.company_id).await?;
    Ok(Json(emails))
}

pub async fn list_replies(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(email_id): Path<Uuid>,
) -> Result<Json<Vec<EmailReply>>, ApiError> {
    let mut conn = state.conn().await?;

    EmailMessage::find_for_company(&mut conn, email_id, auth.company_id)
        .await
        .map_err(|_| ApiError::not_found("Email"))?;

    let replies = EmailReply::list_for_email(&mut conn, email_id).await?;
    Ok(Json(replies))
}

/// Heuristic classification plus a suggested reply for one email
pub async fn analyze(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(email_id): Path<Uuid>,
) -> Result<Json<EmailAnalysis>, ApiError> {
    let mut conn = state.conn().await?;

    let email = EmailMessage::find_for_company(&mut conn, email_id, auth.company_id)
        .await
        .map_err(|_| ApiError::not_found("Email"))?;
    let company = Company::find_by_id(&mut conn, auth.company_id).await?;

    let analysis = analyze_email(&mut conn, &email, Some(&company)).await?;
    Ok(Json(analysis))
}

/// Manual intake for an email pasted or forwarded by an operator
pub async fn receive(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<ReceiveEmailRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let mut conn = state.conn().await?;
    let (email, company_id) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: payload.from_email,
            subject: payload.subject,
            body: payload.body,
            company_id: Some(auth.company_id),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "email": email,
            "company_id": company_id,
        })),
    ))
}

/// Synchronous reply generation. The reply row is committed here;
/// delivery is deferred to the task runner.
pub async fn generate_reply(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(email_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut conn = state.conn().await?;

    EmailMessage::find_for_company(&mut conn, email_id, auth.company_id)
        .await
        .map_err(|_| ApiError::not_found("Email"))?;

    match generate_email_reply(&mut conn, &state.ai_client, email_id).await? {
        Some(reply) => {
            // Enqueued only after the reply row is committed
            state.task_queue.enqueue(Task::dispatch(reply.id));
            Ok((StatusCode::CREATED, Json(json!({ "reply": reply }))))
        },
        None => Ok((
            StatusCode::OK,
            Json(json!({
                "reply": null,
                "message": "Auto-reply is disabled for this company",
            })),
        )),
    }
}
