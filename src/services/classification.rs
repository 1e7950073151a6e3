// Heuristic email classification.
//
// A deterministic, explainable keyword classifier - deliberately not a
// learned model. Rules are checked in priority order and matching is
// case-insensitive substring, so behavior stays exactly testable.

use diesel_async::AsyncPgConnection;
use serde::Serialize;

use crate::models::{Company, EmailMessage, TriggerType};
use crate::services::templates::{latest_template, render};

/// Ordered category rules: first match wins
pub const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Lead",
        &["pricing", "demo", "trial", "quote", "signup", "sales", "buy", "purchase"],
    ),
    (
        "Support",
        &["help", "issue", "error", "bug", "problem", "support", "not working"],
    ),
    (
        "Billing",
        &["invoice", "billing", "refund", "charge", "payment", "receipt"],
    ),
];

/// Ordered priority rules: first match wins
pub const PRIORITY_RULES: &[(&str, &[&str])] = &[
    ("high", &["urgent", "asap", "immediately", "critical", "outage", "down"]),
    ("medium", &["soon", "priority", "important", "follow up", "follow-up"]),
];

pub const MATCH_CONFIDENCE: u8 = 88;
pub const FALLBACK_CONFIDENCE: u8 = 72;

const SUMMARY_MAX_LENGTH: usize = 180;

/// Analysis result for an inbound email
#[derive(Debug, Clone, Serialize)]
pub struct EmailAnalysis {
    pub category: String,
    pub priority: String,
    pub summary: String,
    pub confidence: u8,
    pub reply_suggestion: String,
}

fn normalize(subject: &str, body: &str) -> String {
    format!("{} {}", subject, body).to_lowercase()
}

/// Map free text to a category with a fixed confidence score
pub fn classify_category(subject: &str, body: &str) -> (&'static str, u8) {
    let text = normalize(subject, body);
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            return (category, MATCH_CONFIDENCE);
        }
    }
    ("Other", FALLBACK_CONFIDENCE)
}

/// Map free text to a priority; "low" when nothing matches
pub fn classify_priority(subject: &str, body: &str) -> &'static str {
    let text = normalize(subject, body);
    for (priority, keywords) in PRIORITY_RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            return priority;
        }
    }
    "low"
}

/// Whitespace-normalized truncation, preferring a sentence boundary
pub fn summarize_email(body: &str) -> String {
    let text = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return "No message body provided.".to_string();
    }
    if text.chars().count() <= SUMMARY_MAX_LENGTH {
        return text;
    }

    let truncated: String = text.chars().take(SUMMARY_MAX_LENGTH - 1).collect();
    if let Some(pos) = truncated.rfind('.') {
        return format!("{}.", truncated[..pos].trim_end());
    }
    format!("{}...", truncated.trim_end())
}

/// Build a suggested reply body: rendered email template if the company
/// has one, a generic acknowledgment otherwise.
async fn build_reply_suggestion(
    conn: &mut AsyncPgConnection,
    email: &EmailMessage,
    company: Option<&Company>,
) -> Result<String, diesel::result::Error> {
    if let Some(company) = company {
        if let Some(template) =
            latest_template(conn, TriggerType::Email, Some(company.id)).await?
        {
            let context = std::collections::HashMap::from([
                ("email", email.from_email.clone()),
                ("subject", email.subject.clone()),
                ("body", email.body.clone()),
            ]);
            return Ok(render(&template, &context).body);
        }
    }
    Ok(
        "Thanks for reaching out! We've received your message and will follow up shortly \
         with next steps. If you have any additional details, feel free to reply to this email."
            .to_string(),
    )
}

/// Full analysis of an inbound email
pub async fn analyze_email(
    conn: &mut AsyncPgConnection,
    email: &EmailMessage,
    company: Option<&Company>,
) -> Result<EmailAnalysis, diesel::result::Error> {
    let (category, confidence) = classify_category(&email.subject, &email.body);
    let priority = classify_priority(&email.subject, &email.body);
    let summary = summarize_email(&email.body);
    let reply_suggestion = build_reply_suggestion(conn, email, company).await?;

    Ok(EmailAnalysis {
        category: category.to_string(),
        priority: priority.to_string(),
        summary,
        confidence,
        reply_suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_keywords_match_with_fixed_confidence() {
        for keyword in ["pricing", "demo", "trial", "quote", "signup", "sales", "buy", "purchase"]
        {
            let (category, confidence) =
                classify_category(&format!("question about {}", keyword), "");
            assert_eq!(category, "Lead", "keyword {}", keyword);
            assert_eq!(confidence, 88);
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify_category("PRICING REQUEST", ""), ("Lead", 88));
        assert_eq!(classify_category("", "Need HELP with setup"), ("Support", 88));
        assert_eq!(classify_priority("URGENT", ""), "high");
    }

    #[test]
    fn test_category_order_is_lead_first() {
        // Contains both Lead and Support keywords; Lead rule runs first
        let (category, _) = classify_category("demo broken", "there is an error in the demo");
        assert_eq!(category, "Lead");

        // Support beats Billing
        let (category, _) = classify_category("help with invoice", "");
        assert_eq!(category, "Support");
    }

    #[test]
    fn test_no_match_yields_other() {
        assert_eq!(classify_category("hello there", "just saying hi"), ("Other", 72));
    }

    #[test]
    fn test_priority_rules() {
        assert_eq!(classify_priority("this is urgent", ""), "high");
        assert_eq!(classify_priority("", "please follow up soon"), "medium");
        assert_eq!(classify_priority("important request", ""), "medium");
        // High-urgency keywords outrank medium ones regardless of position
        assert_eq!(classify_priority("important: site is down", ""), "high");
        assert_eq!(classify_priority("hello", "nothing special"), "low");
    }

    #[test]
    fn test_summarize_short_body() {
        assert_eq!(summarize_email("  Hello   world  "), "Hello world");
        assert_eq!(summarize_email(""), "No message body provided.");
        assert_eq!(summarize_email("   \n\t "), "No message body provided.");
    }

    #[test]
    fn test_summarize_truncates_at_sentence_boundary() {
        let body = format!("First sentence. {}", "x".repeat(300));
        assert_eq!(summarize_email(&body), "First sentence.");
    }

    #[test]
    fn test_summarize_truncates_with_ellipsis() {
        let body = "word ".repeat(100);
        let summary = summarize_email(&body);
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= 183);
    }
}
