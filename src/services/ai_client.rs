// AI completion client.
//
// One outbound POST per call to a chat-completion endpoint with bearer
// auth. Any failure (network, non-2xx, malformed JSON) is logged and the
// fixed fallback sentence is returned - this client never errors past its
// boundary. Retry is the delivery dispatcher's concern, not this layer's.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument};

use crate::app_config::AiConfig;

/// Returned whenever the completion endpoint cannot produce a reply
pub const FALLBACK_REPLY: &str =
    "Thanks for reaching out. Our team is reviewing your request and will respond shortly.";

const SYSTEM_PROMPT: &str = "You are an expert B2B support assistant.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Clone)]
pub struct AiClient {
    http: Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, config }
    }

    /// True when a real API key is configured
    pub fn is_configured(&self) -> bool {
        self.config.has_api_key()
    }

    /// Generate a reply for the given prompt. Always returns usable text;
    /// failures are logged and replaced with the fallback sentence.
    #[instrument(skip(self, prompt))]
    pub async fn generate_reply(&self, prompt: &str, model: Option<&str>) -> String {
        match self.try_generate(prompt, model).await {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to generate AI reply: {}", e);
                FALLBACK_REPLY.to_string()
            },
        }
    }

    async fn try_generate(&self, prompt: &str, model: Option<&str>) -> anyhow::Result<String> {
        let payload = ChatCompletionRequest {
            model: model.unwrap_or(&self.config.default_model),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let data: ChatCompletionResponse = response.json().await?;
        let content = data
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow::anyhow!("completion response contained no choices"))?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> AiConfig {
        AiConfig {
            // Nothing listens on the discard port; connection fails fast
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 300,
            request_timeout: 2,
        }
    }

    #[tokio::test]
    async fn test_network_failure_returns_fallback() {
        let client = AiClient::new(unreachable_config());
        let reply = client.generate_reply("Say hello", None).await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mut config = unreachable_config();
        config.base_url = "http://127.0.0.1:9/".to_string();
        let client = AiClient::new(config);
        // Still resolves to a well-formed URL and falls back cleanly
        let reply = client.generate_reply("ping", Some("other-model")).await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[test]
    fn test_request_payload_shape() {
        let payload = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.3,
            max_tokens: 300,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 300);
    }
}
