//! Global configuration types for Holicard.
//!
//! `GlobalConfig` represents the optional `config.toml` in the data
//! directory. Every field has a default so an empty or missing file works.
//! Credentials are never read from this file.

use serde::{Deserialize, Serialize};

use crate::image::Orientation;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub images: ImageConfig,
}

/// Text generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Provider name; well-known names ("openai", "gemini", "mistral")
    /// select a default base URL.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Override the provider's base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.8
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Image lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_images_enabled")]
    pub enabled: bool,

    /// Images requested per card.
    #[serde(default = "default_per_card")]
    pub per_card: usize,

    /// Bounded wait for the image service, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub orientation: Orientation,
}

fn default_images_enabled() -> bool {
    true
}

fn default_per_card() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: default_images_enabled(),
            per_card: default_per_card(),
            timeout_secs: default_timeout_secs(),
            orientation: Orientation::default(),
        }
    }
}
