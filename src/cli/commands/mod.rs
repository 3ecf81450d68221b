//! CLI command implementations.

pub mod browse;
pub mod bypass;
pub mod config;
pub mod download;
pub mod downloads;
pub mod episodes;
pub mod favorites;
pub mod history;
pub mod info;
pub mod resolve;
pub mod search;
pub mod skip;

use crate::core::resolver::{HttpEmbedEngine, Resolver};
use crate::models::config::{data_dir, load_config, Config};
use crate::services::http::HttpClient;
use crate::services::source::Source;
use crate::store::{DownloadStore, FavoriteStore, HistoryStore};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Shared wiring for every command: config, HTTP client, scraper, stores.
pub struct Context {
    pub config: Config,
    pub http: HttpClient,
    pub source: Source,
}

impl Context {
    pub fn new() -> Result<Self> {
        let config = load_config();
        let http = HttpClient::new(&config)?;
        let source = Source::new(http.clone(), config.base_url.clone());
        Ok(Self {
            config,
            http,
            source,
        })
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(
            Arc::new(HttpEmbedEngine::new(self.http.clone())),
            Duration::from_secs(self.config.resolve_timeout_secs),
        )
    }

    pub fn download_store(&self) -> Result<Arc<DownloadStore>> {
        Ok(Arc::new(DownloadStore::open(
            data_dir().join("downloads.json"),
        )?))
    }

    pub fn history_store(&self) -> Result<HistoryStore> {
        HistoryStore::open(data_dir().join("watch_history.json"))
    }

    pub fn favorite_store(&self) -> Result<FavoriteStore> {
        FavoriteStore::open(data_dir().join("favorites.json"))
    }
}
