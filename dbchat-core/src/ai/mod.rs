//! Natural-language query generation.
//!
//! # Module Structure
//! - `clients`: HTTP chat clients for OpenAI, Azure OpenAI and Ollama
//! - `enhancer`: schema narrative with relationship guesses and dialect advice
//! - `prompt`: the enhanced and basic system prompt templates
//! - `orchestrator`: prompt assembly, client caching and reply parsing
//!
//! Every provider is reached through the [`ChatClient`] capability interface,
//! so tests and embedders can substitute their own implementation.

use crate::{Result, config::AiSettings, error::DbChatError, models::ChatMessage};
use async_trait::async_trait;
use std::sync::Arc;

pub mod clients;
pub mod enhancer;
pub mod orchestrator;
pub mod prompt;

pub use clients::{AzureOpenAiClient, OllamaClient, OpenAiClient};
pub use orchestrator::AiOrchestrator;

/// Chat provider selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiService {
    /// OpenAI chat completions (`OpenAI`)
    OpenAi,
    /// Azure OpenAI deployment (`AzureOpenAI`); the model is the deployment name
    AzureOpenAi,
    /// Self-hosted Ollama server (`Ollama`)
    Ollama,
}

impl AiService {
    /// Every provider, in the order they are listed to users.
    pub const ALL: [AiService; 3] = [Self::OpenAi, Self::AzureOpenAi, Self::Ollama];

    /// Service tag as accepted by [`FromStr`](std::str::FromStr).
    pub fn tag(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::AzureOpenAi => "AzureOpenAI",
            Self::Ollama => "Ollama",
        }
    }

    /// Whether the provider accepts `system`-role messages.
    ///
    /// Ollama models handle them inconsistently, so the system prompt is sent
    /// as the first user message instead.
    pub fn supports_system_role(self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for AiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for AiService {
    type Err = DbChatError;

    /// Parses a service tag, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|service| service.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DbChatError::configuration(format!(
                    "Unsupported AI service '{}', expected one of OpenAI, AzureOpenAI, Ollama",
                    s
                ))
            })
    }
}

/// Capability interface over one provider's chat-completions endpoint.
///
/// # Object Safety
/// This trait is object-safe; the orchestrator holds clients as
/// `Arc<dyn ChatClient>`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the conversation and returns the single completion text.
    ///
    /// # Errors
    /// Returns `Transport` when the request cannot be completed,
    /// `UpstreamProvider` for a non-success status (body kept verbatim) and
    /// `ResponseParse` when the reply envelope has no completion text.
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Provider this client talks to.
    fn service(&self) -> AiService;

    /// Model (or Azure deployment) name.
    fn model(&self) -> &str;
}

fn required<'a>(value: Option<&'a str>, what: &str, service: AiService) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DbChatError::configuration(format!("Missing {} for {}", what, service)))
}

/// Creates the chat client for `service` and `model`.
///
/// Credentials are checked here, before any network call.
///
/// # Errors
/// Returns `Configuration` if the model name is blank or the provider's key or
/// endpoint is missing from `settings`.
///
/// # Example
/// ```rust
/// use dbchat_core::ai::{AiService, create_chat_client};
/// use dbchat_core::config::AiSettings;
///
/// let settings = AiSettings::default();
/// assert!(create_chat_client(AiService::OpenAi, "gpt-4o", &settings).is_err());
///
/// let settings = settings.with_ollama_endpoint("http://localhost:11434");
/// let client = create_chat_client(AiService::Ollama, "llama3", &settings).unwrap();
/// assert_eq!(client.model(), "llama3");
/// ```
pub fn create_chat_client(
    service: AiService,
    model: &str,
    settings: &AiSettings,
) -> Result<Arc<dyn ChatClient>> {
    let model = model.trim();
    if model.is_empty() {
        return Err(DbChatError::configuration(format!(
            "A model name is required for {}",
            service
        )));
    }

    let client: Arc<dyn ChatClient> = match service {
        AiService::OpenAi => {
            let key = required(settings.openai_key.as_deref(), "OpenAI API key", service)?;
            Arc::new(OpenAiClient::new(key, model))
        }
        AiService::AzureOpenAi => {
            let endpoint = required(
                settings.azure_openai_endpoint.as_deref(),
                "Azure OpenAI endpoint",
                service,
            )?;
            let key = required(
                settings.azure_openai_key.as_deref(),
                "Azure OpenAI API key",
                service,
            )?;
            Arc::new(AzureOpenAiClient::new(
                endpoint,
                key,
                model,
                &settings.azure_openai_version,
            ))
        }
        AiService::Ollama => {
            let endpoint = required(
                settings.ollama_endpoint.as_deref(),
                "Ollama endpoint",
                service,
            )?;
            Arc::new(OllamaClient::new(endpoint, model))
        }
    };

    tracing::debug!("Created {} client for model {}", service, model);
    Ok(client)
}
