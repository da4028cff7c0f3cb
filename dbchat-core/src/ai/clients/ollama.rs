use super::send_chat_request;
use crate::Result;
use crate::ai::{AiService, ChatClient};
use crate::error::DbChatError;
use crate::models::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Client for a self-hosted Ollama server's `/api/chat` endpoint.
#[derive(Debug)]
pub struct OllamaClient {
    http: reqwest::Client,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(server: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.to_string(),
            endpoint: format!("{}/api/chat", server.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body sent for `messages`. Streaming is always off so the reply is
    /// one JSON document.
    pub fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!(self.request(messages))
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
        }
    }

    /// Extracts `message.content` from an `/api/chat` reply.
    pub fn extract_content(body: &str) -> Result<String> {
        serde_json::from_str::<OllamaResponse>(body)
            .map(|response| response.message.content)
            .map_err(|e| {
                tracing::error!("Failed to parse Ollama response: {}", e);
                DbChatError::response_parse("Ollama response has no message.content", body)
            })
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::info!("Sending request to Ollama with model: {}", self.model);
        tracing::debug!("API URL: {}", self.endpoint);

        let request = self.http.post(&self.endpoint).json(&self.request(messages));
        let body = send_chat_request("Ollama", request).await?;
        Self::extract_content(&body)
    }

    fn service(&self) -> AiService {
        AiService::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_body() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/chat");
        assert_eq!(
            client.request_body(&[ChatMessage::user("hi")]),
            serde_json::json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"model":"llama3","created_at":"2024-01-01T00:00:00Z","message":{"role":"assistant","content":"SELECT 1"},"done":true}"#;
        assert_eq!(OllamaClient::extract_content(body).unwrap(), "SELECT 1");

        let err = OllamaClient::extract_content(r#"{"error":"model not found"}"#).unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = OllamaClient::new("http://127.0.0.1:1", "llama3");
        let err = client
            .complete_chat(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbChatError::Transport { .. }));
        assert!(err.to_string().starts_with("Ollama request failed"));
    }
}
