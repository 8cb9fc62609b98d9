use moka::sync::Cache;

use crate::config::Config;
use crate::db::DbClient;
use crate::storage::StorageClient;

/// Shared application state. Every vendor client is constructed once here
/// and handed to handlers by injection; nothing is reached through globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub db: DbClient,
    pub storage: StorageClient,
    /// Bounded memo for query expansion: same query, same expansion.
    pub expansion_cache: Cache<String, String>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let db = DbClient::new(http_client.clone(), config.database.clone());
        let storage = StorageClient::new(http_client.clone(), config.storage.clone());
        let expansion_cache = Cache::new(config.expansion_cache_size);

        Ok(Self {
            config,
            http_client,
            db,
            storage,
            expansion_cache,
        })
    }
}
