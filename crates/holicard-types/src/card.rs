//! Card types: what the generator produces, what the cache stores, and
//! what the cache-backed generation path hands back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::holiday::CardKey;

/// Prefix marking a card that was served from the cache.
pub const CACHE_HIT_MARKER: &str = "💾";

/// A persisted card row. At most one exists per [`CardKey`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCard {
    pub key: CardKey,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Output of the card generator.
///
/// Both variants carry user-facing text and both are cached as-is; the tag
/// only exists so callers can tell a failure-derived body from a real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedCard {
    Written(String),
    Failed(String),
}

impl GeneratedCard {
    pub fn body(&self) -> &str {
        match self {
            GeneratedCard::Written(text) | GeneratedCard::Failed(text) => text,
        }
    }

    pub fn into_body(self) -> String {
        match self {
            GeneratedCard::Written(text) | GeneratedCard::Failed(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, GeneratedCard::Failed(_))
    }
}

/// Where a served card came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSource {
    Cache,
    Generated,
    /// Freshly generated, but the generator reported a failure.
    GenerationFailed,
}

/// A card as returned by `get_or_generate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedCard {
    pub source: CardSource,
    body: String,
}

impl ServedCard {
    pub fn from_cache(body: String) -> Self {
        Self {
            source: CardSource::Cache,
            body,
        }
    }

    pub fn from_generator(card: GeneratedCard) -> Self {
        let source = if card.is_failure() {
            CardSource::GenerationFailed
        } else {
            CardSource::Generated
        };
        Self {
            source,
            body: card.into_body(),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.source == CardSource::Cache
    }

    /// The stored body, without the cache marker.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Text to show the user: cached cards get the marker prefix.
    pub fn text(&self) -> String {
        if self.is_cached() {
            format!("{CACHE_HIT_MARKER} {}", self.body)
        } else {
            self.body.clone()
        }
    }
}

/// Counters reported by the stats command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub countries: u64,
    pub cards: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_card_text_has_marker() {
        let card = ServedCard::from_cache("T1".to_string());
        assert!(card.is_cached());
        assert_eq!(card.text(), "💾 T1");
        assert_eq!(card.body(), "T1");
    }

    #[test]
    fn test_generated_card_text_is_unmarked() {
        let card = ServedCard::from_generator(GeneratedCard::Written("T1".to_string()));
        assert_eq!(card.source, CardSource::Generated);
        assert_eq!(card.text(), "T1");
    }

    #[test]
    fn test_failed_generation_keeps_its_tag() {
        let card = ServedCard::from_generator(GeneratedCard::Failed("oops".to_string()));
        assert_eq!(card.source, CardSource::GenerationFailed);
        assert!(!card.is_cached());
        assert_eq!(card.text(), "oops");
    }
}
