//! UnsplashImageSearch -- concrete [`ImageSearch`] over the Unsplash
//! photo search API (`GET /search/photos`).
//!
//! The access key is wrapped in [`SecretString`] and only exposed when
//! building the `Authorization` header. Without a key every search reports
//! [`ImageError::MissingCredentials`] without touching the network.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use holicard_core::image::ImageSearch;
use holicard_types::error::ImageError;
use holicard_types::image::ImageQuery;

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Unsplash allows at most 30 results per page.
const MAX_PER_PAGE: usize = 30;

pub struct UnsplashImageSearch {
    client: reqwest::Client,
    access_key: Option<SecretString>,
    base_url: String,
}

impl UnsplashImageSearch {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(access_key: Option<SecretString>, timeout: Duration) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            access_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.access_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
    small: Option<String>,
}

fn parse_results(body: &str) -> Result<Vec<String>, ImageError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| ImageError::Deserialization(e.to_string()))?;

    Ok(response
        .results
        .into_iter()
        .filter_map(|photo| photo.urls.regular.or(photo.urls.small))
        .collect())
}

fn map_request_error(err: reqwest::Error) -> ImageError {
    if err.is_timeout() {
        ImageError::Timeout
    } else {
        ImageError::Request(err.to_string())
    }
}

impl ImageSearch for UnsplashImageSearch {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn search(&self, query: &ImageQuery) -> Result<Vec<String>, ImageError> {
        let Some(key) = &self.access_key else {
            return Err(ImageError::MissingCredentials);
        };

        let per_page = query.count.clamp(1, MAX_PER_PAGE).to_string();
        let orientation = query.orientation.to_string();

        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .header("Authorization", format!("Client-ID {}", key.expose_secret()))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query.text.as_str()),
                ("per_page", per_page.as_str()),
                ("orientation", orientation.as_str()),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => ImageError::MissingCredentials,
                403 | 429 => ImageError::RateLimited,
                code => ImageError::Status(code),
            });
        }

        let body = response.text().await.map_err(map_request_error)?;
        let mut urls = parse_results(&body)?;
        urls.truncate(query.count);
        Ok(urls)
    }
}
