//! Application state wiring the infrastructure together.
//!
//! AppState resolves the data directory, loads `config.toml` and the
//! credentials, opens the database and hands out the concrete services
//! used by every command.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use holicard_core::card::generator::{CardGenerator, GenerationSettings};
use holicard_core::card::service::CardService;
use holicard_core::flow::controller::FlowController;
use holicard_core::flow::transport::ChatTransport;
use holicard_core::image::finder::ImageFinder;
use holicard_infra::config::{load_global_config, resolve_data_dir};
use holicard_infra::image::unsplash::UnsplashImageSearch;
use holicard_infra::llm::create_provider;
use holicard_infra::secret::{Credentials, OPENAI_KEY_ENV, UNSPLASH_KEY_ENV};
use holicard_infra::sqlite::card_cache::SqliteCardCache;
use holicard_infra::sqlite::pool::{DatabasePool, database_url};
use holicard_types::config::GlobalConfig;

pub type ConcreteCardService = CardService<SqliteCardCache>;

pub type ConcreteController<T> = FlowController<T, SqliteCardCache, UnsplashImageSearch>;

/// Shared application state.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: GlobalConfig,
    pub credentials: Credentials,
    pub db_pool: DatabasePool,
    pub cache: SqliteCardCache,
}

impl AppState {
    /// Initialize the application state: data dir, config, DB.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let credentials = Credentials::from_env();

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;
        let cache = SqliteCardCache::new(db_pool.clone());

        Ok(Self {
            data_dir,
            config,
            credentials,
            db_pool,
            cache,
        })
    }

    /// Card service backed by the SQLite cache and the configured generator.
    pub fn card_service(&self) -> ConcreteCardService {
        let provider = create_provider(
            &self.config.generator,
            self.credentials.openai_key.as_ref().map(reveal),
        );
        let generator = CardGenerator::new(provider, GenerationSettings::from(&self.config.generator));
        CardService::new(self.cache.clone(), generator)
    }

    /// Flow controller talking through `transport`.
    pub fn controller<T: ChatTransport>(&self, transport: T) -> anyhow::Result<ConcreteController<T>> {
        let search = UnsplashImageSearch::new(
            self.credentials.unsplash_key.as_ref().map(reveal),
            Duration::from_secs(self.config.images.timeout_secs),
        )?;
        let images = ImageFinder::new(search, &self.config.images);

        Ok(FlowController::new(transport, self.card_service(), images)
            .with_images_per_card(self.config.images.per_card))
    }

    /// Log what will not work with the current credentials.
    pub fn warn_missing_credentials(&self) {
        if self.credentials.openai_key.is_none() {
            warn!(
                "{OPENAI_KEY_ENV} is not set: every card will be an error message, and that message is cached"
            );
        }
        if self.credentials.unsplash_key.is_none() && self.config.images.enabled {
            warn!("{UNSPLASH_KEY_ENV} is not set: cards are sent without photos");
        }
    }

    pub async fn close(&self) {
        self.db_pool.close().await;
    }
}

fn reveal(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_string())
}
