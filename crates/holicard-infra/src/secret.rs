//! Credentials from environment variables.
//!
//! Values are wrapped in [`SecretString`] as soon as they are read so they
//! never end up in logs or Debug output. Empty variables count as unset.

use secrecy::SecretString;

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const UNSPLASH_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Credentials for the external services.
#[derive(Default)]
pub struct Credentials {
    pub telegram_token: Option<SecretString>,
    pub openai_key: Option<SecretString>,
    pub unsplash_key: Option<SecretString>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(SecretString::from)
        };

        Self {
            telegram_token: secret(TELEGRAM_TOKEN_ENV),
            openai_key: secret(OPENAI_KEY_ENV),
            unsplash_key: secret(UNSPLASH_KEY_ENV),
        }
    }
}
