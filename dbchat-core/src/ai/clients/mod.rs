//! HTTP chat clients, one per provider.
//!
//! All three post JSON with `reqwest` and read the body as text first so a
//! failing or malformed reply can be reported verbatim.

use crate::{Result, error::DbChatError};
use serde::Deserialize;

mod azure;
mod ollama;
mod openai;

pub use azure::AzureOpenAiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Sends a prepared request and returns the body of a successful response.
///
/// Non-success statuses become `UpstreamProvider` with the body attached.
pub(crate) async fn send_chat_request(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|source| transport_error(provider, source))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| transport_error(provider, source))?;

    if !status.is_success() {
        tracing::error!(
            "{} API responded with status code {}: {}",
            provider,
            status,
            body
        );
        return Err(DbChatError::UpstreamProvider {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    tracing::debug!("{} replied with {} bytes", provider, body.len());
    Ok(body)
}

fn transport_error(provider: &str, source: reqwest::Error) -> DbChatError {
    tracing::error!("{} request failed: {}", provider, source);
    DbChatError::Transport {
        provider: provider.to_string(),
        source,
    }
}

#[derive(Deserialize)]
struct ChoicesEnvelope {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Extracts `choices[0].message.content` from an OpenAI-style reply.
pub(crate) fn first_choice_content(provider: &str, body: &str) -> Result<String> {
    serde_json::from_str::<ChoicesEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.choices.into_iter().next())
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            DbChatError::response_parse(
                format!("{} response has no choices[0].message.content", provider),
                body,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice_content() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hello"}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"total_tokens": 12}
        }"#;
        assert_eq!(first_choice_content("OpenAI", body).unwrap(), "hello");
    }

    #[test]
    fn test_first_choice_content_missing_path() {
        for body in [
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"error": "overloaded"}"#,
            "<html>Bad Gateway</html>",
        ] {
            match first_choice_content("OpenAI", body) {
                Err(DbChatError::ResponseParse { raw_response, .. }) => {
                    assert_eq!(raw_response, body)
                }
                other => panic!("expected ResponseParse for {body}, got {other:?}"),
            }
        }
    }
}
