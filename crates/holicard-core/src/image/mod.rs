//! Image lookup for rendered cards.
//!
//! - `ImageSearch`: RPITIT trait for concrete image services (Unsplash)
//! - `ImageFinder`: best-effort wrapper that never surfaces an error

pub mod finder;

use holicard_types::error::ImageError;
use holicard_types::image::ImageQuery;

/// Trait for image search backends.
///
/// Implementations return up to `query.count` image URLs in relevance
/// order. Implementations live in holicard-infra.
pub trait ImageSearch: Send + Sync {
    /// Human-readable service name (e.g., "unsplash").
    fn name(&self) -> &str;

    fn search(
        &self,
        query: &ImageQuery,
    ) -> impl std::future::Future<Output = Result<Vec<String>, ImageError>> + Send;
}
