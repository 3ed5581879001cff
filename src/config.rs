use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::storage::ResultCache;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_path: PathBuf,
    pub feed_url_template: String,

    // Analysis settings
    pub max_headlines: usize,
    pub cache_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("news.db"),
            feed_url_template:
                "https://news.google.com/rss/search?q={symbol}+stock&hl=en-US&gl=US&ceid=US:en"
                    .to_string(),
            max_headlines: 3,
            cache_ttl_minutes: 10,
        }
    }
}

pub async fn load_config() -> Result<Config> {
    let mut config = Config::default();

    // Override defaults with environment variables
    if let Ok(database_path) = env::var("NEWSPULSE_DB") {
        config.database_path = PathBuf::from(database_path);
    }

    if let Ok(feed_url_template) = env::var("NEWSPULSE_FEED_URL") {
        config.feed_url_template = feed_url_template;
    }

    if let Ok(max_headlines) = env::var("NEWSPULSE_MAX_HEADLINES") {
        match max_headlines.parse() {
            Ok(n) => config.max_headlines = n,
            Err(_) => warn!("Ignoring invalid NEWSPULSE_MAX_HEADLINES: {}", max_headlines),
        }
    }

    if let Ok(ttl) = env::var("NEWSPULSE_CACHE_TTL_MINUTES") {
        match ttl.parse() {
            Ok(n) => config.cache_ttl_minutes = n,
            Err(_) => warn!("Ignoring invalid NEWSPULSE_CACHE_TTL_MINUTES: {}", ttl),
        }
    }

    Ok(config)
}

pub async fn initialize_config() -> Result<()> {
    info!("Initializing configuration...");

    let config = load_config().await?;

    info!("Using database at: {}", config.database_path.display());

    // Open the cache database once so the table exists before the first request
    match ResultCache::open(&config.database_path, config.cache_ttl_minutes) {
        Ok(_) => info!("Cache database ready"),
        Err(e) => warn!("Could not open cache database: {}", e),
    }

    info!(
        "News feed template: {} (max {} headlines, {} minute cache window)",
        config.feed_url_template, config.max_headlines, config.cache_ttl_minutes
    );

    info!("Configuration initialized successfully!");
    Ok(())
}
