//! Cache-backed card service.
//!
//! `CardService` sits in front of the [`CardGenerator`] and serves each
//! (country, holiday) pair from the [`CardCache`] when it can.

use holicard_types::card::{CacheStats, CachedCard, ServedCard};
use holicard_types::error::RepositoryError;
use holicard_types::holiday::{CardKey, HolidayKind};
use tracing::{info, warn};

use crate::card::generator::CardGenerator;
use crate::storage::card_cache::CardCache;

/// Generic over `CardCache` so holicard-core never depends on the SQLite
/// adapter.
pub struct CardService<C: CardCache> {
    cache: C,
    generator: CardGenerator,
}

impl<C: CardCache> CardService<C> {
    pub fn new(cache: C, generator: CardGenerator) -> Self {
        Self { cache, generator }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn generator(&self) -> &CardGenerator {
        &self.generator
    }

    /// Serve a card from the cache, generating and storing it on a miss.
    ///
    /// Generated text is stored whether or not generation succeeded, so a
    /// failure text keeps being served until the cache is cleared.
    /// Concurrent misses for one key may both generate; the last write wins.
    #[tracing::instrument(name = "get_or_generate", skip(self, country), fields(country = %country, holiday = %holiday))]
    pub async fn get_or_generate(
        &self,
        country: &str,
        holiday: HolidayKind,
    ) -> Result<ServedCard, RepositoryError> {
        let key = CardKey::new(country, holiday);

        if let Some(body) = self.cache.get(&key).await? {
            info!("cache hit");
            return Ok(ServedCard::from_cache(body));
        }

        info!("cache miss, generating");
        let card = self.generator.generate(country, holiday).await;
        if card.is_failure() {
            warn!("storing failed generation text");
        }
        self.cache.put(&key, card.body()).await?;

        Ok(ServedCard::from_generator(card))
    }

    /// Distinct countries and total cards in the cache.
    pub async fn stats(&self) -> Result<CacheStats, RepositoryError> {
        Ok(CacheStats {
            countries: self.cache.count_distinct_countries().await?,
            cards: self.cache.count_all().await?,
        })
    }

    pub async fn list_cards(&self) -> Result<Vec<CachedCard>, RepositoryError> {
        self.cache.list_entries().await
    }

    /// Remove every cached card. Returns how many were removed.
    pub async fn clear(&self) -> Result<u64, RepositoryError> {
        let removed = self.cache.clear_all().await?;
        info!(removed, "card cache cleared");
        Ok(removed)
    }
}
