//! Holiday card generation via LLM.
//!
//! `CardGenerator::generate` asks the text generator for a themed card about
//! how a country celebrates a holiday. It never fails: provider errors are
//! folded into a user-facing [`GeneratedCard::Failed`] text.
//! `CardGenerator::check` sends a minimal request to verify the provider
//! accepts the configured credentials and model.

use std::time::{Duration, Instant};

use holicard_types::card::GeneratedCard;
use holicard_types::config::GeneratorConfig;
use holicard_types::holiday::HolidayKind;
use holicard_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use crate::llm::box_provider::BoxLlmProvider;

/// System prompt describing the card format.
const CARD_SYSTEM_PROMPT: &str = r#"You are a warm, well-travelled guide to holiday traditions around the world. Write a short festive card about how the given country celebrates the given holiday.

Structure the card with these sections, each starting with a fitting emoji:
1. Festive attire: what people traditionally wear for the occasion.
2. Customs and food: the key rituals and the dishes on the table.
3. Film: one movie that captures the spirit of the holiday in that country, with a sentence on why.
4. Music: one song or piece of music people associate with the celebration.
5. Try it at home: one concrete tip for adapting the tradition anywhere.

Keep it under 250 words, friendly and specific. Do not invent facts; prefer well-known traditions."#;

/// Output budget of the connectivity check.
const CHECK_MAX_TOKENS: u32 = 16;

/// Prefix of the text returned when generation fails.
pub const FAILURE_PREFIX: &str = "⚠️ Could not generate the card";

/// Sampling settings for card generation.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&GeneratorConfig> for GenerationSettings {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

/// Outcome of a successful [`CardGenerator::check`].
#[derive(Debug, Clone)]
pub struct GeneratorCheck {
    pub provider: String,
    /// Model reported by the provider.
    pub model: String,
    pub latency: Duration,
}

/// Produces card text for a (country, holiday) pair.
pub struct CardGenerator {
    provider: BoxLlmProvider,
    settings: GenerationSettings,
}

impl CardGenerator {
    pub fn new(provider: BoxLlmProvider, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Build the completion request for one card.
    pub fn build_request(&self, country: &str, holiday: HolidayKind) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message {
                role: MessageRole::User,
                content: format!(
                    "Tell me how {} is celebrated in {country}.",
                    holiday.label()
                ),
            }],
            system: Some(CARD_SYSTEM_PROMPT.to_string()),
            max_tokens: self.output_budget(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
        }
    }

    /// `wanted` capped by what the provider's model can emit.
    fn output_budget(&self, wanted: u32) -> u32 {
        wanted.min(self.provider.capabilities().max_output_tokens)
    }

    /// Send a tiny completion and report who answered.
    ///
    /// Unlike [`generate`](Self::generate) this surfaces the provider error,
    /// so callers can refuse to start with a broken key or model.
    #[tracing::instrument(
        name = "check_generator",
        skip(self),
        fields(provider = %self.provider.name(), model = %self.settings.model)
    )]
    pub async fn check(&self) -> Result<GeneratorCheck, LlmError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message {
                role: MessageRole::User,
                content: "Reply with the single word OK.".to_string(),
            }],
            system: None,
            max_tokens: self.output_budget(CHECK_MAX_TOKENS),
            temperature: None,
        };

        let started = Instant::now();
        let response = self.provider.complete(&request).await?;
        let latency = started.elapsed();
        tracing::debug!(
            response_id = %response.id,
            latency_ms = latency.as_millis() as u64,
            "generator check passed"
        );

        Ok(GeneratorCheck {
            provider: self.provider.name().to_string(),
            model: response.model,
            latency,
        })
    }

    /// Generate a card. Failures come back as [`GeneratedCard::Failed`]
    /// carrying the failure detail.
    #[tracing::instrument(
        name = "generate_card",
        skip(self),
        fields(
            provider = %self.provider.name(),
            model = %self.settings.model,
            response_id = tracing::field::Empty,
            input_tokens = tracing::field::Empty,
            output_tokens = tracing::field::Empty
        )
    )]
    pub async fn generate(&self, country: &str, holiday: HolidayKind) -> GeneratedCard {
        let request = self.build_request(country, holiday);

        match self.request_text(&request).await {
            Ok(text) => {
                tracing::debug!(chars = text.len(), "card generated");
                GeneratedCard::Written(text)
            }
            Err(e) => {
                tracing::warn!(error = %e, "card generation failed");
                GeneratedCard::Failed(failure_text(&e))
            }
        }
    }

    async fn request_text(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let response = self.provider.complete(request).await?;

        let span = tracing::Span::current();
        span.record("response_id", response.id.as_str());
        span.record("input_tokens", response.usage.input_tokens);
        span.record("output_tokens", response.usage.output_tokens);
        if response.model != self.settings.model {
            tracing::debug!(served_by = %response.model, "provider answered with another model");
        }

        let text = response.content.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

fn failure_text(error: &LlmError) -> String {
    format!("{FAILURE_PREFIX}: {error}")
}
