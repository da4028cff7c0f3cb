//! Query generation pipeline.
//!
//! Builds the system prompt from a schema, sends it with the user's request to
//! the selected provider and parses the reply into a [`GeneratedQuery`].
//!
//! Chat clients are cached per `(service, model)` pair, so asking for a
//! different provider or model never reuses a client built for another one.
//! Methods that may create a client take `&mut self`; share an orchestrator
//! between tasks behind a lock or create one per request.

use super::{AiService, ChatClient, create_chat_client, prompt::build_system_prompt};
use crate::Result;
use crate::config::AiSettings;
use crate::error::DbChatError;
use crate::models::{ChatMessage, DatabaseSchema, GeneratedQuery};
use std::collections::HashMap;
use std::sync::Arc;

/// Turns natural-language requests into SQL through a chat provider.
pub struct AiOrchestrator {
    settings: AiSettings,
    clients: HashMap<(AiService, String), Arc<dyn ChatClient>>,
}

impl std::fmt::Debug for AiOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiOrchestrator")
            .field("settings", &self.settings)
            .field("clients", &self.clients.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AiOrchestrator {
    pub fn new(settings: AiSettings) -> Self {
        Self {
            settings,
            clients: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Registers a pre-built client under its own service and model.
    pub fn with_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.clients
            .insert((client.service(), client.model().to_string()), client);
        self
    }

    /// Returns the cached client for `(service, model)`, creating it on first
    /// use.
    ///
    /// # Errors
    /// Returns `Configuration` if the provider's credentials are missing.
    pub fn client(&mut self, service: AiService, model: &str) -> Result<Arc<dyn ChatClient>> {
        let key = (service, model.trim().to_string());
        if let Some(client) = self.clients.get(&key) {
            return Ok(Arc::clone(client));
        }

        let client = create_chat_client(service, model, &self.settings)?;
        self.clients.insert(key, Arc::clone(&client));
        Ok(client)
    }

    /// Generates a SQL query for `prompt` against `schema`.
    ///
    /// # Errors
    /// Returns `Configuration` for invalid settings or missing credentials,
    /// any client error from the provider call, and `ResponseParse` (carrying
    /// the raw reply) when the reply is not the expected JSON object.
    pub async fn generate_query(
        &mut self,
        service: AiService,
        model: &str,
        prompt: &str,
        schema: &DatabaseSchema,
        dialect: &str,
    ) -> Result<GeneratedQuery> {
        self.settings.validate()?;
        let client = self.client(service, model)?;

        let system_prompt = build_system_prompt(
            schema,
            dialect,
            self.settings.max_rows,
            self.settings.enhanced_prompts,
        );
        tracing::info!(
            "Generating {} query with {} model {}",
            dialect,
            service,
            model
        );
        tracing::debug!(
            "System prompt is {} characters ({} template)",
            system_prompt.len(),
            if self.settings.enhanced_prompts {
                "enhanced"
            } else {
                "basic"
            }
        );

        let messages = build_messages(service, system_prompt, prompt);
        let reply = client.complete_chat(&messages).await?;
        parse_generated_query(&reply)
    }

    /// Sends `messages` unchanged and returns the provider's reply.
    ///
    /// # Errors
    /// Returns `Configuration` if the provider's credentials are missing, or
    /// any client error from the provider call.
    pub async fn chat_prompt(
        &mut self,
        messages: &[ChatMessage],
        service: AiService,
        model: &str,
    ) -> Result<String> {
        let client = self.client(service, model)?;
        client.complete_chat(messages).await
    }
}

/// Orders the system prompt and the user request for `service`.
///
/// Providers without system-role support receive the system prompt as the
/// first user message.
pub fn build_messages(
    service: AiService,
    system_prompt: impl Into<String>,
    user_prompt: impl Into<String>,
) -> Vec<ChatMessage> {
    let instructions = if service.supports_system_role() {
        ChatMessage::system(system_prompt)
    } else {
        ChatMessage::user(system_prompt)
    };
    vec![instructions, ChatMessage::user(user_prompt)]
}

/// Strips code fences and literal `\n` escapes from a model reply.
pub fn clean_response(reply: &str) -> String {
    reply
        .replace("```json", "")
        .replace("```", "")
        .replace("\\n", " ")
        .trim()
        .to_string()
}

/// Parses a cleaned reply as `{"summary": ..., "query": ...}`.
///
/// Extra keys are ignored.
///
/// # Errors
/// Returns `ResponseParse` with the original, uncleaned reply.
///
/// # Example
/// ```rust
/// use dbchat_core::ai::orchestrator::parse_generated_query;
///
/// let reply = "```json\n{\"summary\":\"s\",\"query\":\"SELECT 1\"}\\n```";
/// let generated = parse_generated_query(reply).unwrap();
/// assert_eq!(generated.summary, "s");
/// assert_eq!(generated.query, "SELECT 1");
/// ```
pub fn parse_generated_query(reply: &str) -> Result<GeneratedQuery> {
    serde_json::from_str::<GeneratedQuery>(&clean_response(reply)).map_err(|e| {
        tracing::error!("Unable to parse AI response: {}", e);
        DbChatError::response_parse(
            format!("Unable to parse AI response as a SQL query ({})", e),
            reply,
        )
    })
}
