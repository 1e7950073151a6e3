// Lead capture shared by the public form, the chat widget and the
// authenticated API. Captures the row, writes an activity entry and,
// when the tenant is known, renders the lead auto-reply inline.

use diesel_async::AsyncPgConnection;
use uuid::Uuid;

use crate::models::{Company, Lead, LeadStatus, NewLead};
use crate::services::activity::{log_activity, ActivityEntry};
use crate::services::orchestrator::generate_lead_reply;
use crate::services::templates::RenderedReply;

#[derive(Debug, Clone, Default)]
pub struct LeadCapture {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tags: Option<String>,
    pub conversation_summary: Option<String>,
    pub preferred_language: Option<String>,
}

/// Persist a captured lead. Company is optional: public submissions
/// without an API key stay unscoped until claimed.
pub async fn capture_lead(
    conn: &mut AsyncPgConnection,
    company: Option<&Company>,
    capture: LeadCapture,
    captured_by: Option<Uuid>,
) -> Result<(Lead, Option<RenderedReply>), diesel::result::Error> {
    let lead = Lead::create(
        conn,
        NewLead {
            company_id: company.map(|c| c.id),
            name: capture.name,
            email: capture.email,
            phone: capture.phone,
            message: capture.message,
            source: capture.source,
            tags: capture.tags,
            conversation_summary: capture.conversation_summary,
            preferred_language: capture.preferred_language,
            status: LeadStatus::New.as_str().to_string(),
        },
    )
    .await?;

    let auto_reply = match company {
        Some(company) => {
            log_activity(
                conn,
                ActivityEntry {
                    action: "lead_captured",
                    entity_type: "lead",
                    entity_id: Some(lead.id),
                    company_id: company.id,
                    user_id: captured_by,
                    description: lead.source.as_deref(),
                },
            )
            .await?;
            generate_lead_reply(conn, &lead, company).await?
        },
        None => None,
    };

    Ok((lead, auto_reply))
}
