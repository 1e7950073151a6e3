// Stored mailbox-provider credentials authorizing outbound sends.
// Upserted by (company, provider, address); at most one connected
// integration is consulted per send.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::email_integrations;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntegrationStatus {
    Connected,
    Disconnected,
}

impl IntegrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationStatus::Connected => "connected",
            IntegrationStatus::Disconnected => "disconnected",
        }
    }
}

impl FromStr for IntegrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(IntegrationStatus::Connected),
            "disconnected" => Ok(IntegrationStatus::Disconnected),
            _ => Err(format!("Invalid integration status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = email_integrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailIntegration {
    pub id: Uuid,
    pub company_id: Uuid,
    pub provider: String,
    pub email_address: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub scopes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = email_integrations)]
pub struct NewEmailIntegration {
    pub company_id: Uuid,
    pub provider: String,
    pub email_address: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub scopes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl EmailIntegration {
    pub async fn find_by_key(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        provider_name: &str,
        address: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::email_integrations::dsl::*;

        email_integrations
            .filter(company_id.eq(owner))
            .filter(provider.eq(provider_name))
            .filter(email_address.eq(address))
            .first::<EmailIntegration>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_integration: NewEmailIntegration,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(email_integrations::table)
            .values(&new_integration)
            .get_result::<EmailIntegration>(conn)
            .await
    }

    pub async fn list_for_company(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::email_integrations::dsl::*;

        email_integrations
            .filter(company_id.eq(owner))
            .order(updated_at.desc())
            .load::<EmailIntegration>(conn)
            .await
    }

    /// The single integration consulted per send: status=connected,
    /// most recently updated first, optionally filtered by provider.
    /// Ties on updated_at resolve by id so the pick is stable across calls.
    pub async fn find_active(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        provider_filter: Option<&str>,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::email_integrations::dsl::*;

        let mut query = email_integrations
            .filter(company_id.eq(owner))
            .filter(status.eq(IntegrationStatus::Connected.as_str()))
            .into_boxed();

        if let Some(p) = provider_filter {
            query = query.filter(provider.eq(p.to_string()));
        }

        query
            .order((updated_at.desc(), id.desc()))
            .first::<EmailIntegration>(conn)
            .await
            .optional()
    }

    pub fn status_enum(&self) -> IntegrationStatus {
        IntegrationStatus::from_str(&self.status).unwrap_or(IntegrationStatus::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_status_conversion() {
        assert_eq!(
            IntegrationStatus::from_str("connected"),
            Ok(IntegrationStatus::Connected)
        );
        assert_eq!(
            IntegrationStatus::from_str("disconnected"),
            Ok(IntegrationStatus::Disconnected)
        );
        assert!(IntegrationStatus::from_str("expired").is_err());
    }
}
