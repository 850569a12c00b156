//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use scribe_infra::{DatabaseConfig, FileStoreConfig};

/// Which post store backs the service.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    File(FileStoreConfig),
    Postgres(DatabaseConfig),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            store: Self::store_from_env(),
        }
    }

    /// POST_STORE=memory|file|postgres
    fn store_from_env() -> StoreConfig {
        let kind = env::var("POST_STORE").unwrap_or_else(|_| "memory".to_string());

        match kind.to_lowercase().as_str() {
            "memory" => StoreConfig::Memory,
            "file" => {
                let dir = env::var("POST_STORE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data"));
                let threshold = parse_var("WAL_COMPACT_THRESHOLD").unwrap_or(1024);
                StoreConfig::File(FileStoreConfig::new(dir).with_compact_threshold(threshold))
            }
            "postgres" => match env::var("DATABASE_URL") {
                Ok(url) => {
                    let mut database = DatabaseConfig::new(url);
                    if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                        database.max_connections = max;
                    }
                    if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                        database.min_connections = min;
                    }
                    StoreConfig::Postgres(database)
                }
                Err(_) => {
                    tracing::warn!("POST_STORE=postgres but DATABASE_URL not set. Using in-memory store.");
                    StoreConfig::Memory
                }
            },
            other => {
                tracing::warn!(store = %other, "Unknown POST_STORE value. Using in-memory store.");
                StoreConfig::Memory
            }
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
