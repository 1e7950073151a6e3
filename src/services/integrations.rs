// Email integration management: upsert by (company, provider, address),
// and resolution of the single active integration consulted per send.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::models::{EmailIntegration, IntegrationStatus, NewEmailIntegration};

/// Connect/refresh payload for a provider mailbox
#[derive(Debug, Clone)]
pub struct IntegrationConnect {
    pub provider: String,
    pub email_address: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub scopes: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Upsert an integration keyed by (company, provider, address).
/// Reconnecting always resets status to connected and bumps updated_at,
/// which also makes this integration the active one.
pub async fn upsert_integration(
    conn: &mut AsyncPgConnection,
    company: Uuid,
    payload: IntegrationConnect,
) -> Result<EmailIntegration, diesel::result::Error> {
    use crate::schema::email_integrations::dsl::*;

    let joined_scopes = payload.scopes.map(|s| s.join(","));

    let existing =
        EmailIntegration::find_by_key(conn, company, &payload.provider, &payload.email_address)
            .await?;

    match existing {
        Some(integration) => {
            diesel::update(email_integrations.filter(id.eq(integration.id)))
                .set((
                    access_token.eq(payload.access_token),
                    refresh_token.eq(payload.refresh_token),
                    token_type.eq(payload.token_type),
                    scopes.eq(joined_scopes),
                    expires_at.eq(payload.expires_at),
                    status.eq(IntegrationStatus::Connected.as_str()),
                    updated_at.eq(diesel::dsl::now),
                ))
                .get_result::<EmailIntegration>(conn)
                .await
        },
        None => {
            EmailIntegration::create(
                conn,
                NewEmailIntegration {
                    company_id: company,
                    provider: payload.provider,
                    email_address: payload.email_address,
                    access_token: payload.access_token,
                    refresh_token: payload.refresh_token,
                    token_type: payload.token_type,
                    scopes: joined_scopes,
                    expires_at: payload.expires_at,
                    status: IntegrationStatus::Connected.as_str().to_string(),
                },
            )
            .await
        },
    }
}

pub async fn list_integrations(
    conn: &mut AsyncPgConnection,
    company: Uuid,
) -> Result<Vec<EmailIntegration>, diesel::result::Error> {
    EmailIntegration::list_for_company(conn, company).await
}

/// Most-recently-updated connected integration, optionally provider-filtered
pub async fn get_active_integration(
    conn: &mut AsyncPgConnection,
    company: Uuid,
    provider: Option<&str>,
) -> Result<Option<EmailIntegration>, diesel::result::Error> {
    EmailIntegration::find_active(conn, company, provider).await
}
