use std::path::PathBuf;

use common::storage::DEFAULT_MAX_ATTACHMENT_SIZE;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Any origin is allowed when empty.
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the attachment store.
    pub root: PathBuf,
    /// Per-attachment size ceiling in bytes.
    pub max_attachment_size: u64,
    pub write_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data/attachments"),
            max_attachment_size: DEFAULT_MAX_ATTACHMENT_SIZE,
            write_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Records per page on the catalog read endpoint.
    pub page_size: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { page_size: 6 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://data/sthala.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("storage.root", "./data/attachments")?
            .set_default("storage.max_attachment_size", DEFAULT_MAX_ATTACHMENT_SIZE)?
            .set_default("storage.write_timeout_secs", 30)?
            .set_default("catalog.page_size", 6)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., STHALA__DATABASE__URL)
            .add_source(Environment::with_prefix("STHALA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
