//! Photo lookup for a rendered card.
//!
//! Wraps an [`ImageSearch`] backend and turns a (country, holiday) pair
//! into a search in the configured orientation. Disabled search, missing
//! credentials and backend errors all yield an empty list so the card is still sent.

use holicard_types::config::ImageConfig;
use holicard_types::error::ImageError;
use holicard_types::holiday::HolidayKind;
use holicard_types::image::{ImageQuery, Orientation};
use tracing::{debug, warn};

use super::ImageSearch;

/// Best-effort image lookup: every failure degrades to "no images".
pub struct ImageFinder<I: ImageSearch> {
    search: I,
    enabled: bool,
    orientation: Orientation,
}

impl<I: ImageSearch> ImageFinder<I> {
    pub fn new(search: I, config: &ImageConfig) -> Self {
        Self {
            search,
            enabled: config.enabled,
            orientation: config.orientation,
        }
    }

    pub fn search(&self) -> &I {
        &self.search
    }

    /// Up to `count` image URLs illustrating the celebration.
    #[tracing::instrument(name = "find_images", skip(self, country), fields(country = %country, holiday = %holiday, service = %self.search.name()))]
    pub async fn find_images(&self, country: &str, holiday: HolidayKind, count: usize) -> Vec<String> {
        if !self.enabled || count == 0 {
            return Vec::new();
        }

        let query = ImageQuery {
            text: build_query(country, holiday),
            count,
            orientation: self.orientation,
        };

        match self.search.search(&query).await {
            Ok(mut urls) => {
                urls.truncate(count);
                debug!(found = urls.len(), "image search finished");
                urls
            }
            Err(ImageError::MissingCredentials) => {
                debug!("image search not configured, skipping images");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "image search failed, continuing without images");
                Vec::new()
            }
        }
    }
}

/// Free-text search query for a celebration.
pub fn build_query(country: &str, holiday: HolidayKind) -> String {
    format!(
        "{} celebration in {country}, traditional, festive, authentic",
        holiday.english_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ImageScript, ScriptedImageSearch};

    fn finder(search: ScriptedImageSearch) -> ImageFinder<ScriptedImageSearch> {
        ImageFinder::new(search, &ImageConfig::default())
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query("Japan", HolidayKind::NewYear),
            "New Year celebration in Japan, traditional, festive, authentic"
        );
    }

    #[tokio::test]
    async fn test_find_images_caps_at_count() {
        let search = ScriptedImageSearch::urls(5);
        let queries = search.queries.clone();
        let finder = finder(search);

        let urls = finder.find_images("Mexico", HolidayKind::Christmas, 3).await;
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0], "https://images.example/1.jpg");

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].count, 3);
        assert_eq!(queries[0].orientation, Orientation::Landscape);
        assert!(queries[0].text.starts_with("Christmas celebration in Mexico"));
    }

    #[tokio::test]
    async fn test_find_images_returns_fewer_when_service_has_fewer() {
        let finder = finder(ScriptedImageSearch::urls(1));
        assert_eq!(finder.find_images("Iceland", HolidayKind::NewYear, 3).await.len(), 1);
    }

    #[tokio::test]
    async fn test_find_images_swallows_failures() {
        let finder = finder(ScriptedImageSearch::new(ImageScript::Fail));
        assert!(finder.find_images("Peru", HolidayKind::Christmas, 3).await.is_empty());

        let finder = finder_without_key();
        assert!(finder.find_images("Peru", HolidayKind::Christmas, 3).await.is_empty());
    }

    fn finder_without_key() -> ImageFinder<ScriptedImageSearch> {
        finder(ScriptedImageSearch::new(ImageScript::NoCredentials))
    }

    #[tokio::test]
    async fn test_disabled_finder_skips_search() {
        let search = ScriptedImageSearch::urls(3);
        let queries = search.queries.clone();
        let config = ImageConfig {
            enabled: false,
            ..ImageConfig::default()
        };
        let finder = ImageFinder::new(search, &config);

        assert!(finder.find_images("Spain", HolidayKind::Christmas, 3).await.is_empty());
        assert!(queries.lock().unwrap().is_empty());
    }
}
