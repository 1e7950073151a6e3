// Outbound delivery dispatcher.
//
// Providers sit behind the `ProviderClient` trait so the dispatch state
// machine never knows which mailbox API it is talking to. Both shipped
// clients are simulated sends that return deterministic message ids; the
// trait boundary is where real OAuth'd API calls would slot in.
//
// Dispatch outcomes map onto the reply state machine: success is terminal
// "sent", configuration problems (no integration, unknown provider) are
// terminal "failed", and provider errors become "retry" for the task
// runner to re-attempt.

use async_trait::async_trait;
use diesel_async::AsyncPgConnection;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{EmailIntegration, EmailMessage, EmailReply};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no connected email integration for company")]
    NoIntegration,

    #[error("email is not linked to a company")]
    MissingCompany,

    #[error("unsupported email provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider send failed: {0}")]
    Provider(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// Result of a single dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Delivered; carries the provider message id
    Sent(String),
    /// Transient provider failure, eligible for another attempt
    Retry(String),
    /// Terminal failure, no further attempts
    Failed(String),
    /// Reply was already in a terminal state; nothing done
    Skipped,
}

/// Mailbox provider behind a uniform send interface
#[async_trait]
pub trait ProviderClient: Send + Sync + std::fmt::Debug {
    fn provider_name(&self) -> &'static str;

    async fn send_email(
        &self,
        integration: &EmailIntegration,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, DeliveryError>;
}

/// Simulated Gmail API send
#[derive(Debug)]
pub struct GmailClient;

#[async_trait]
impl ProviderClient for GmailClient {
    fn provider_name(&self) -> &'static str {
        "gmail"
    }

    async fn send_email(
        &self,
        integration: &EmailIntegration,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> Result<String, DeliveryError> {
        info!(to = to, subject = subject, "Simulated Gmail send");
        Ok(format!(
            "gmail-{}-{}",
            integration.id,
            integration.updated_at.timestamp()
        ))
    }
}

/// Simulated Microsoft Graph send
#[derive(Debug)]
pub struct OutlookClient;

#[async_trait]
impl ProviderClient for OutlookClient {
    fn provider_name(&self) -> &'static str {
        "outlook"
    }

    async fn send_email(
        &self,
        integration: &EmailIntegration,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> Result<String, DeliveryError> {
        info!(to = to, subject = subject, "Simulated Outlook send");
        Ok(format!(
            "outlook-{}-{}",
            integration.id,
            integration.updated_at.timestamp()
        ))
    }
}

/// Select a client for a stored provider name. Microsoft mailboxes show
/// up under several aliases depending on which OAuth app connected them.
pub fn client_for(provider: &str) -> Result<Box<dyn ProviderClient>, DeliveryError> {
    match provider.to_lowercase().as_str() {
        "gmail" => Ok(Box::new(GmailClient)),
        "outlook" | "microsoft365" | "microsoft" => Ok(Box::new(OutlookClient)),
        other => Err(DeliveryError::UnsupportedProvider(other.to_string())),
    }
}

/// Attempt delivery of one reply, advancing its send status. DB errors
/// bubble up so the task runner can treat them as retryable.
pub async fn dispatch_reply(
    conn: &mut AsyncPgConnection,
    reply_id: Uuid,
) -> Result<DispatchOutcome, DeliveryError> {
    let reply = EmailReply::find_by_id(conn, reply_id).await?;
    if reply.send_status_enum().is_terminal() {
        info!(reply_id = %reply_id, status = %reply.send_status, "Reply already settled, skipping");
        return Ok(DispatchOutcome::Skipped);
    }

    let email = EmailMessage::find_by_id(conn, reply.email_id).await?;

    let Some(company_id) = email.company_id else {
        let reason = DeliveryError::MissingCompany.to_string();
        EmailReply::mark_failed(conn, reply_id, &reason).await?;
        warn!(reply_id = %reply_id, "Dispatch failed: {}", reason);
        return Ok(DispatchOutcome::Failed(reason));
    };

    let Some(integration) = EmailIntegration::find_active(conn, company_id, None).await? else {
        let reason = DeliveryError::NoIntegration.to_string();
        EmailReply::mark_failed(conn, reply_id, &reason).await?;
        warn!(reply_id = %reply_id, company_id = %company_id, "Dispatch failed: {}", reason);
        return Ok(DispatchOutcome::Failed(reason));
    };

    let client = match client_for(&integration.provider) {
        Ok(client) => client,
        Err(e) => {
            // Unknown provider is a configuration error; retrying cannot help
            let reason = e.to_string();
            EmailReply::mark_failed(conn, reply_id, &reason).await?;
            warn!(reply_id = %reply_id, "Dispatch failed: {}", reason);
            return Ok(DispatchOutcome::Failed(reason));
        },
    };

    EmailReply::mark_attempt(conn, reply_id, client.provider_name()).await?;

    match client
        .send_email(&integration, &email.from_email, &reply.subject, &reply.body)
        .await
    {
        Ok(message_id) => {
            EmailReply::mark_sent(conn, reply_id, &message_id).await?;
            info!(
                reply_id = %reply_id,
                provider = client.provider_name(),
                message_id = %message_id,
                "Reply delivered"
            );
            Ok(DispatchOutcome::Sent(message_id))
        },
        Err(e) => {
            let reason = e.to_string();
            EmailReply::mark_retry(conn, reply_id, &reason).await?;
            warn!(reply_id = %reply_id, "Dispatch attempt failed: {}", reason);
            Ok(DispatchOutcome::Retry(reason))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn integration_fixture() -> EmailIntegration {
        let updated = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        EmailIntegration {
            id: Uuid::nil(),
            company_id: Uuid::new_v4(),
            provider: "gmail".to_string(),
            email_address: "sales@acme.test".to_string(),
            access_token: "token".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            scopes: None,
            expires_at: None,
            status: "connected".to_string(),
            created_at: updated,
            updated_at: updated,
        }
    }

    #[test]
    fn test_provider_selection_aliases() {
        assert_eq!(client_for("gmail").unwrap().provider_name(), "gmail");
        assert_eq!(client_for("Gmail").unwrap().provider_name(), "gmail");
        assert_eq!(client_for("outlook").unwrap().provider_name(), "outlook");
        assert_eq!(client_for("microsoft365").unwrap().provider_name(), "outlook");
        assert_eq!(client_for("microsoft").unwrap().provider_name(), "outlook");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = client_for("yahoo").unwrap_err();
        assert!(matches!(err, DeliveryError::UnsupportedProvider(p) if p == "yahoo"));
    }

    #[tokio::test]
    async fn test_simulated_message_id_format() {
        let integration = integration_fixture();
        let ts = integration.updated_at.timestamp();

        let id = GmailClient
            .send_email(&integration, "a@b.test", "Re: hi", "body")
            .await
            .unwrap();
        assert_eq!(id, format!("gmail-{}-{}", integration.id, ts));

        let id = OutlookClient
            .send_email(&integration, "a@b.test", "Re: hi", "body")
            .await
            .unwrap();
        assert_eq!(id, format!("outlook-{}-{}", integration.id, ts));
    }
}
