// Reply generation orchestrator.
//
// Combines the template store, renderer and AI client to produce a
// subject/body pair for an inbound email or a captured lead. The same
// logic runs synchronously (explicit "generate reply" API action) and
// from the background task runner (webhook intake); only the caller
// differs.

use std::collections::HashMap;

use diesel_async::{AsyncConnection, AsyncPgConnection};
use tracing::info;
use uuid::Uuid;

use crate::models::{Company, EmailMessage, EmailReply, Lead, NewEmailReply, TriggerType};
use crate::services::activity::{log_activity, ActivityEntry};
use crate::services::ai_client::AiClient;
use crate::services::templates::{latest_template, render, RenderedReply};

const GENERIC_ACK_PROMPT: &str =
    "Write a brief, friendly acknowledgment reply to the email below. Thank the sender, \
     confirm their message was received, and let them know the team will follow up shortly.";

/// Generate and persist a reply for an inbound email.
///
/// Policy, in order: no company or auto-reply disabled produces nothing;
/// a matching email template supplies the subject (and the body when the
/// AI endpoint is not configured); with AI configured the body is drafted
/// from a prompt composed of the company's prompt template, the template's
/// tone/category metadata and the original message. Without a template the
/// generic acknowledgment prompt goes straight to the AI client under a
/// "Re: {subject}" subject.
///
/// On success the reply row is pending, the source email is marked
/// processed and an activity entry is written, all in one transaction.
pub async fn generate_email_reply(
    conn: &mut AsyncPgConnection,
    ai: &AiClient,
    email_id: Uuid,
) -> Result<Option<EmailReply>, diesel::result::Error> {
    let email = EmailMessage::find_by_id(conn, email_id).await?;

    let Some(company_id) = email.company_id else {
        info!(email_id = %email_id, "Email has no company, skipping auto-reply");
        return Ok(None);
    };
    let company = Company::find_by_id(conn, company_id).await?;

    if !company.auto_reply_enabled {
        info!(email_id = %email_id, company_id = %company.id, "Auto-reply disabled, skipping");
        return Ok(None);
    }

    let template = latest_template(conn, TriggerType::Email, Some(company.id)).await?;

    let (subject, body) = match template {
        Some(template) => {
            let rendered = render(&template, &email_context(&email));
            let body = if ai.is_configured() {
                let prompt = compose_prompt(
                    &company.ai_prompt_template,
                    template.tone.as_deref(),
                    template.category.as_deref(),
                    &rendered.subject,
                    &email,
                );
                ai.generate_reply(&prompt, Some(&company.ai_model)).await
            } else {
                rendered.body
            };
            (rendered.subject, body)
        },
        None => {
            let prompt = format!(
                "{}\n\nFrom: {}\nSubject: {}\n\n{}",
                GENERIC_ACK_PROMPT, email.from_email, email.subject, email.body
            );
            let body = ai.generate_reply(&prompt, Some(&company.ai_model)).await;
            (format!("Re: {}", email.subject), body)
        },
    };

    let reply = conn
        .transaction::<_, diesel::result::Error, _>(|tx| {
            let company_id = company.id;
            Box::pin(async move {
                let reply =
                    EmailReply::create(tx, NewEmailReply::pending(email_id, subject, body))
                        .await?;
                EmailMessage::mark_processed(tx, email_id).await?;
                log_activity(
                    tx,
                    ActivityEntry {
                        action: "reply_generated",
                        entity_type: "email_reply",
                        entity_id: Some(reply.id),
                        company_id,
                        user_id: None,
                        description: Some("Auto-reply generated for inbound email"),
                    },
                )
                .await?;
                Ok(reply)
            })
        })
        .await?;

    info!(reply_id = %reply.id, email_id = %email_id, "Reply generated");
    Ok(Some(reply))
}

/// Generate an inline reply for a newly captured lead.
///
/// Leads have no email row to attach a reply to, so the rendered pair is
/// returned to the caller (e.g. embedded in the public form response)
/// rather than persisted. Nothing is produced when auto-reply is disabled
/// or no lead template exists.
pub async fn generate_lead_reply(
    conn: &mut AsyncPgConnection,
    lead: &Lead,
    company: &Company,
) -> Result<Option<RenderedReply>, diesel::result::Error> {
    if !company.auto_reply_enabled {
        return Ok(None);
    }

    let Some(template) = latest_template(conn, TriggerType::Lead, Some(company.id)).await? else {
        return Ok(None);
    };

    let rendered = render(&template, &lead_context(lead));

    log_activity(
        conn,
        ActivityEntry {
            action: "reply_generated",
            entity_type: "lead",
            entity_id: Some(lead.id),
            company_id: company.id,
            user_id: None,
            description: Some("Auto-reply rendered for new lead"),
        },
    )
    .await?;

    Ok(Some(rendered))
}

fn email_context(email: &EmailMessage) -> HashMap<&'static str, String> {
    HashMap::from([
        ("email", email.from_email.clone()),
        ("subject", email.subject.clone()),
        ("body", email.body.clone()),
    ])
}

fn lead_context(lead: &Lead) -> HashMap<&'static str, String> {
    HashMap::from([
        ("name", lead.name.clone()),
        ("email", lead.email.clone()),
        ("phone", lead.phone.clone().unwrap_or_default()),
        ("message", lead.message.clone().unwrap_or_default()),
        ("source", lead.source.clone().unwrap_or_default()),
    ])
}

fn compose_prompt(
    prompt_template: &str,
    tone: Option<&str>,
    category: Option<&str>,
    subject: &str,
    email: &EmailMessage,
) -> String {
    let mut prompt = String::from(prompt_template);
    prompt.push_str("\n\nDraft the body of a reply email.");
    if let Some(tone) = tone {
        prompt.push_str(&format!("\nTone: {}", tone));
    }
    if let Some(category) = category {
        prompt.push_str(&format!("\nCategory: {}", category));
    }
    prompt.push_str(&format!(
        "\nReply subject: {}\n\nOriginal message from {} (subject: {}):\n{}",
        subject, email.from_email, email.subject, email.body
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn email_fixture() -> EmailMessage {
        EmailMessage {
            id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            lead_id: None,
            from_email: "sam@x.com".to_string(),
            subject: "Pricing question".to_string(),
            body: "How much does the pro plan cost?".to_string(),
            processed: false,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_includes_metadata_and_context() {
        let email = email_fixture();
        let prompt = compose_prompt(
            "You are a helpful assistant.",
            Some("friendly"),
            Some("sales"),
            "Re: Pricing question",
            &email,
        );
        assert!(prompt.starts_with("You are a helpful assistant."));
        assert!(prompt.contains("Tone: friendly"));
        assert!(prompt.contains("Category: sales"));
        assert!(prompt.contains("Re: Pricing question"));
        assert!(prompt.contains("sam@x.com"));
        assert!(prompt.contains("How much does the pro plan cost?"));
    }

    #[test]
    fn test_prompt_omits_absent_metadata() {
        let email = email_fixture();
        let prompt = compose_prompt("Base.", None, None, "Re: hi", &email);
        assert!(!prompt.contains("Tone:"));
        assert!(!prompt.contains("Category:"));
    }

    #[test]
    fn test_email_context_keys() {
        let email = email_fixture();
        let ctx = email_context(&email);
        assert_eq!(ctx["email"], "sam@x.com");
        assert_eq!(ctx["subject"], "Pricing question");
        assert!(ctx.contains_key("body"));
    }
}
