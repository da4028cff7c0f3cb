//! AI provider settings.
//!
//! Credentials and endpoints for the three chat providers plus the row limit
//! written into generated prompts. Values normally come from the environment
//! through the CLI; library callers can build them directly.

use serde::{Deserialize, Serialize};

/// Default Azure OpenAI REST API version
pub const DEFAULT_AZURE_OPENAI_VERSION: &str = "2023-12-01-preview";

/// Default row limit written into generated queries
pub const DEFAULT_MAX_ROWS: u32 = 100;

/// Provider credentials and prompt settings.
///
/// # Example
/// ```rust
/// use dbchat_core::config::AiSettings;
///
/// let settings = AiSettings::default()
///     .with_ollama_endpoint("http://localhost:11434")
///     .with_max_rows(50);
/// assert!(settings.validate().is_ok());
/// assert_eq!(settings.max_rows, 50);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// OpenAI API key
    pub openai_key: Option<String>,
    /// Azure OpenAI resource endpoint, e.g. `https://name.openai.azure.com`
    pub azure_openai_endpoint: Option<String>,
    /// Azure OpenAI API key
    pub azure_openai_key: Option<String>,
    /// Azure OpenAI REST API version
    pub azure_openai_version: String,
    /// Ollama server base URL
    pub ollama_endpoint: Option<String>,
    /// Row limit the prompts instruct the model to apply
    pub max_rows: u32,
    /// Use the schema-enhanced prompt template instead of the basic one
    pub enhanced_prompts: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            openai_key: None,
            azure_openai_endpoint: None,
            azure_openai_key: None,
            azure_openai_version: DEFAULT_AZURE_OPENAI_VERSION.to_string(),
            ollama_endpoint: None,
            max_rows: DEFAULT_MAX_ROWS,
            enhanced_prompts: true,
        }
    }
}

impl std::fmt::Debug for AiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "****");
        f.debug_struct("AiSettings")
            .field("openai_key", &redact(&self.openai_key))
            .field("azure_openai_endpoint", &self.azure_openai_endpoint)
            .field("azure_openai_key", &redact(&self.azure_openai_key))
            .field("azure_openai_version", &self.azure_openai_version)
            .field("ollama_endpoint", &self.ollama_endpoint)
            .field("max_rows", &self.max_rows)
            .field("enhanced_prompts", &self.enhanced_prompts)
            .finish()
    }
}

impl AiSettings {
    /// Validates settings that do not depend on the selected provider.
    ///
    /// Per-provider credentials are checked when a client is created.
    ///
    /// # Errors
    /// Returns `Configuration` if `max_rows` is zero or the Azure API version
    /// is blank
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_rows == 0 {
            return Err(crate::error::DbChatError::configuration(
                "max_rows must be greater than 0",
            ));
        }

        if self.azure_openai_version.trim().is_empty() {
            return Err(crate::error::DbChatError::configuration(
                "azure_openai_version cannot be empty",
            ));
        }

        Ok(())
    }

    /// Builder method to set the OpenAI API key.
    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_key = Some(key.into());
        self
    }

    /// Builder method to set the Azure OpenAI endpoint and key.
    pub fn with_azure_openai(mut self, endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        self.azure_openai_endpoint = Some(endpoint.into());
        self.azure_openai_key = Some(key.into());
        self
    }

    /// Builder method to set the Azure OpenAI API version.
    pub fn with_azure_openai_version(mut self, version: impl Into<String>) -> Self {
        self.azure_openai_version = version.into();
        self
    }

    /// Builder method to set the Ollama endpoint.
    pub fn with_ollama_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.ollama_endpoint = Some(endpoint.into());
        self
    }

    /// Builder method to set the row limit.
    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Builder method to choose between the enhanced and basic prompt.
    pub fn with_enhanced_prompts(mut self, enhanced: bool) -> Self {
        self.enhanced_prompts = enhanced;
        self
    }
}
