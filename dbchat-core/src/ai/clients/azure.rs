use super::{first_choice_content, send_chat_request};
use crate::Result;
use crate::ai::{AiService, ChatClient};
use crate::models::ChatMessage;
use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

/// Client for an Azure OpenAI deployment.
///
/// The model name is used as the deployment name in the URL; Azure infers the
/// model from the deployment, so it is not sent in the body.
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    api_key: Zeroizing<String>,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct AzureRequest<'a> {
    messages: &'a [ChatMessage],
}

impl std::fmt::Debug for AzureOpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"****")
            .finish()
    }
}

impl AzureOpenAiClient {
    pub fn new(resource_endpoint: &str, api_key: &str, model: &str, api_version: &str) -> Self {
        let endpoint = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            resource_endpoint.trim_end_matches('/'),
            model,
            api_version
        );
        Self {
            http: reqwest::Client::new(),
            api_key: Zeroizing::new(api_key.to_string()),
            model: model.to_string(),
            endpoint,
        }
    }

    /// Full chat-completions URL including the API version.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!(AzureRequest { messages })
    }
}

#[async_trait]
impl ChatClient for AzureOpenAiClient {
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::info!(
            "Sending {} messages to Azure OpenAI deployment {}",
            messages.len(),
            self.model
        );

        let request = self
            .http
            .post(&self.endpoint)
            .header("api-key", self.api_key.as_str())
            .json(&AzureRequest { messages });

        let body = send_chat_request("Azure OpenAI", request).await?;
        first_choice_content("Azure OpenAI", &body)
    }

    fn service(&self) -> AiService {
        AiService::AzureOpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_template() {
        let client = AzureOpenAiClient::new(
            "https://contoso.openai.azure.com/",
            "az-key",
            "gpt4-prod",
            "2023-12-01-preview",
        );
        assert_eq!(
            client.endpoint(),
            "https://contoso.openai.azure.com/openai/deployments/gpt4-prod/chat/completions?api-version=2023-12-01-preview"
        );
    }

    #[test]
    fn test_body_omits_model() {
        let client = AzureOpenAiClient::new("https://x", "k", "dep", "v1");
        let body = client.request_body(&[ChatMessage::user("hi")]);
        assert_eq!(
            body,
            serde_json::json!({"messages": [{"role": "user", "content": "hi"}]})
        );
    }
}
