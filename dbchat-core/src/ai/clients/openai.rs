use super::{first_choice_content, send_chat_request};
use crate::Result;
use crate::ai::{AiService, ChatClient};
use crate::models::ChatMessage;
use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Client for the public OpenAI chat-completions API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Zeroizing<String>,
    model: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("api_key", &"****")
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: Zeroizing::new(api_key.to_string()),
            model: model.to_string(),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        OPENAI_CHAT_URL
    }

    /// JSON body sent for `messages`.
    pub fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!(OpenAiRequest {
            model: &self.model,
            messages,
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::info!(
            "Sending {} messages to OpenAI model {}",
            messages.len(),
            self.model
        );

        let request = self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(self.api_key.as_str())
            .json(&OpenAiRequest {
                model: &self.model,
                messages,
            });

        let body = send_chat_request("OpenAI", request).await?;
        first_choice_content("OpenAI", &body)
    }

    fn service(&self) -> AiService {
        AiService::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }
}
