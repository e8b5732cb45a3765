//! Card cache trait.
//!
//! Defines the interface for the persistent (country, holiday) -> card body
//! mapping. Implementations live in holicard-infra.

use holicard_types::card::CachedCard;
use holicard_types::error::RepositoryError;
use holicard_types::holiday::CardKey;

/// Trait for the card cache store.
///
/// At most one card exists per [`CardKey`]; `put` overwrites (last write
/// wins). Entries are only removed by `clear_all`.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait CardCache: Send + Sync {
    /// Get a card body by key. Returns None if no card is cached.
    fn get(
        &self,
        key: &CardKey,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Store a card body for a key (upsert).
    fn put(
        &self,
        key: &CardKey,
        body: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Number of distinct countries with at least one cached card.
    fn count_distinct_countries(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Total number of cached cards.
    fn count_all(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Remove every cached card. Returns the number of rows removed.
    fn clear_all(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// All cached cards with timestamps, ordered by country then holiday.
    fn list_entries(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<CachedCard>, RepositoryError>> + Send;
}
