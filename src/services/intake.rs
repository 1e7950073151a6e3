// Email intake pipeline.
//
// Matches the sender address against existing leads - exact equality, the
// system's only identity-resolution mechanism. A matched lead's company
// overrides any company supplied on the payload, and the lead moves to
// "contacted" in the same transaction as the email insert.

use diesel_async::{AsyncConnection, AsyncPgConnection};
use tracing::info;
use uuid::Uuid;

use crate::models::{EmailMessage, Lead, LeadStatus, NewEmailMessage};

/// Inbound email payload, already validated at the HTTP boundary
#[derive(Debug, Clone)]
pub struct InboundEmail {
    pub from_email: String,
    pub subject: String,
    pub body: String,
    /// Tenant resolved from the API key, if any
    pub company_id: Option<Uuid>,
}

/// Persist an inbound email, linking it to a lead on exact address match.
/// Returns the stored message and the resolved company id.
pub async fn receive_email(
    conn: &mut AsyncPgConnection,
    payload: InboundEmail,
) -> Result<(EmailMessage, Option<Uuid>), diesel::result::Error> {
    conn.transaction::<_, diesel::result::Error, _>(|tx| {
        Box::pin(async move {
            let matched_lead = Lead::find_by_email(tx, &payload.from_email).await?;

            let (lead_id, company_id) = match &matched_lead {
                // The matched lead's company wins over the payload's
                Some(lead) => (Some(lead.id), lead.company_id),
                None => (None, payload.company_id),
            };

            if let Some(lead) = &matched_lead {
                Lead::set_status(tx, lead.id, LeadStatus::Contacted).await?;
            }

            let email = EmailMessage::create(
                tx,
                NewEmailMessage {
                    company_id,
                    lead_id,
                    from_email: payload.from_email,
                    subject: payload.subject,
                    body: payload.body,
                },
            )
            .await?;

            info!(
                email_id = %email.id,
                lead_id = ?lead_id,
                company_id = ?company_id,
                "Inbound email received"
            );

            Ok((email, company_id))
        })
    })
    .await
}
