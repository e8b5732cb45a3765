//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `holicard-core`, plus a provider factory
//! ([`create_provider`]) that builds the configured provider.

pub mod openai_compat;

use secrecy::SecretString;

use holicard_core::llm::box_provider::BoxLlmProvider;
use holicard_core::llm::provider::LlmProvider;
use holicard_types::config::GeneratorConfig;
use holicard_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from the generator configuration.
///
/// Uses `base_url` when set, otherwise the defaults of a well-known
/// provider name (unknown names fall back to OpenAI). Without an API key
/// the returned provider rejects every request with
/// [`LlmError::AuthenticationFailed`].
pub fn create_provider(config: &GeneratorConfig, api_key: Option<SecretString>) -> BoxLlmProvider {
    let Some(key) = api_key else {
        tracing::debug!(
            provider = %config.provider_name,
            "no API key configured, using a provider that always fails"
        );
        return BoxLlmProvider::new(UnconfiguredProvider::new(&config.provider_name));
    };

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenAiCompatibleProvider::new(openai_compat::config::custom_config(
            &config.provider_name,
            base_url,
            key,
            &config.model,
        )),
        None => match config.provider_name.as_str() {
            "gemini" => OpenAiCompatibleProvider::gemini(key, &config.model),
            "mistral" => OpenAiCompatibleProvider::mistral(key, &config.model),
            _ => OpenAiCompatibleProvider::openai(key, &config.model),
        },
    };
    BoxLlmProvider::new(provider)
}

/// Stand-in used when no API key is available.
pub struct UnconfiguredProvider {
    name: String,
    capabilities: ProviderCapabilities,
}

impl UnconfiguredProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            capabilities: ProviderCapabilities {
                max_context_tokens: 8_192,
                max_output_tokens: 4_096,
            },
        }
    }
}

impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}
