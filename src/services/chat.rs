// Website chat widget backend.
//
// With an AI key configured, visitor messages go through the completion
// client; without one the widget degrades to a canned reply instead of
// erroring, so the public site never shows a broken chat.

use serde::Serialize;

use crate::services::ai_client::AiClient;
use crate::services::classification::summarize_email;

const CHAT_PROMPT: &str =
    "You are a friendly website assistant for a B2B company. Answer the visitor's \
     message briefly and helpfully, and invite them to share their name and email \
     so the team can follow up.\n\nVisitor message:";

pub const CANNED_CHAT_REPLY: &str =
    "Thanks for your message! A member of our team will get back to you shortly. \
     Feel free to share your name and email so we can follow up directly.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub ai_generated: bool,
}

pub async fn chat_reply(ai: &AiClient, message: &str) -> ChatReply {
    if !ai.is_configured() {
        return ChatReply {
            reply: CANNED_CHAT_REPLY.to_string(),
            ai_generated: false,
        };
    }

    let prompt = format!("{} {}", CHAT_PROMPT, message);
    ChatReply {
        reply: ai.generate_reply(&prompt, None).await,
        ai_generated: true,
    }
}

/// Condense a chat transcript into a lead's conversation summary
pub fn summarize_conversation(messages: &[String]) -> Option<String> {
    let joined = messages
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join(" / ");
    if joined.is_empty() {
        return None;
    }
    Some(summarize_email(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AiConfig;

    fn unconfigured_client() -> AiClient {
        AiClient::new(AiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "change-this-key".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 300,
            request_timeout: 2,
        })
    }

    #[tokio::test]
    async fn test_unconfigured_client_uses_canned_reply() {
        let reply = chat_reply(&unconfigured_client(), "What does your product cost?").await;
        assert_eq!(reply.reply, CANNED_CHAT_REPLY);
        assert!(!reply.ai_generated);
    }

    #[test]
    fn test_summarize_conversation() {
        let messages = vec![
            "Hi there".to_string(),
            "  ".to_string(),
            "Do you have a trial?".to_string(),
        ];
        assert_eq!(
            summarize_conversation(&messages),
            Some("Hi there / Do you have a trial?".to_string())
        );
        assert_eq!(summarize_conversation(&[]), None);
        assert_eq!(summarize_conversation(&["  ".to_string()]), None);
    }

    #[test]
    fn test_long_conversation_is_truncated() {
        let messages = vec!["word ".repeat(100)];
        let summary = summarize_conversation(&messages).unwrap();
        assert!(summary.chars().count() <= 183);
    }
}
