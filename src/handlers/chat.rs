// Public chat widget endpoints, rate limited per client IP.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::app::AppState;
use crate::middleware::api_key::API_KEY_HEADER;
use crate::models::Company;
use crate::services::chat::{chat_reply, summarize_conversation};
use crate::services::leads::{capture_lead, LeadCapture};
use crate::services::rate_limit::{
    check_rate_limit, CHAT_LEAD_LIMIT, CHAT_MESSAGE_LIMIT, WINDOW_SECONDS,
};
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatMessageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatLeadRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// Chat transcript, condensed into the lead's conversation summary
    pub messages: Option<Vec<String>>,
    pub preferred_language: Option<String>,
}

async fn enforce_limit(
    state: &AppState,
    scope: &str,
    addr: SocketAddr,
    limit: i64,
) -> Result<(), ApiError> {
    let decision =
        check_rate_limit(&state.redis_pool, scope, &addr.ip().to_string(), limit, WINDOW_SECONDS)
            .await;
    if decision.allowed {
        Ok(())
    } else {
        Err(ApiError::RateLimited {
            retry_after_seconds: decision.retry_after_seconds,
        })
    }
}

/// Tenant is optional on chat endpoints: a key, when presented, must be
/// valid, but an anonymous widget still works.
async fn optional_company(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Company>, ApiError> {
    let Some(key) = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|k| !k.is_empty())
    else {
        return Ok(None);
    };

    let mut conn = state.conn().await?;
    match Company::find_by_api_key(&mut conn, key).await {
        Ok(company) => Ok(Some(company)),
        Err(diesel::result::Error::NotFound) => {
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        },
        Err(e) => Err(ApiError::internal(e)),
    }
}

pub async fn message(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<ChatMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;
    enforce_limit(&state, "chat:message", addr, CHAT_MESSAGE_LIMIT).await?;

    let reply = chat_reply(&state.ai_client, &payload.message).await;
    Ok(Json(json!({
        "reply": reply.reply,
        "ai_generated": reply.ai_generated,
    })))
}

pub async fn lead(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ChatLeadRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;
    enforce_limit(&state, "chat:lead", addr, CHAT_LEAD_LIMIT).await?;

    let company = optional_company(&state, &headers).await?;
    let conversation_summary = payload
        .messages
        .as_deref()
        .and_then(summarize_conversation);

    let mut conn = state.conn().await?;
    let (lead, auto_reply) = capture_lead(
        &mut conn,
        company.as_ref(),
        LeadCapture {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            message: payload.message,
            source: Some("chat".to_string()),
            conversation_summary,
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
