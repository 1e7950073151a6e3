// Email integration endpoints: connect (upsert) and status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::services::activity::{log_activity, ActivityEntry};
use crate::services::delivery::client_for;
use crate::services::integrations::{list_integrations, upsert_integration, IntegrationConnect};
use crate::utils::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct ConnectIntegrationRequest {
    #[validate(length(min = 1, max = 50))]
    pub provider: String,
    #[validate(email)]
    pub email_address: String,
    #[validate(length(min = 1))]
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub async fn connect(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<ConnectIntegrationRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Connecting integrations requires the admin role".to_string(),
        ));
    }
    payload.validate()?;

    // Reject provider tags the dispatcher cannot deliver through
    client_for(&payload.provider).map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut conn = state.conn().await?;
    let integration = upsert_integration(
        &mut conn,
        auth.company_id,
        IntegrationConnect {
            provider: payload.provider.to_lowercase(),
            email_address: payload.email_address,
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            token_type: payload.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scopes: payload.scopes,
            expires_at: payload.expires_at,
        },
    )
    .await?;

    log_activity(
        &mut conn,
        ActivityEntry {
            action: "integration_connected",
            entity_type: "email_integration",
            entity_id: Some(integration.id),
            company_id: auth.company_id,
            user_id: Some(auth.user_id),
            description: Some(&integration.provider),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "integration": integration })),
    ))
}

pub async fn status(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.conn().await?;
    let integrations = list_integrations(&mut conn, auth.company_id).await?;
    let connected = integrations
        .iter()
        .any(|i| i.status_enum() == crate::models::IntegrationStatus::Connected);

    Ok(Json(json!({
        "integrations": integrations,
        "connected": connected,
    })))
}
