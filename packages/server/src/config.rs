use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use kiosk_common::config::StorageAppConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    /// Allowed origins; empty or `["*"]` allows any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default)]
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            cors: CorsConfig::default(),
        }
    }
}

/// Which persistence backs the entity stores.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One table per kind over `database.url`.
    Sql,
    /// One JSON document per kind under `database.data_dir`.
    #[default]
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_database_url() -> String {
    "sqlite://./data/kiosk.db?mode=rwc".into()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_database_url(),
            data_dir: default_data_dir(),
        }
    }
}

/// Screen slots and their defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    /// Screens whose layout may be updated or deleted.
    #[serde(default = "default_screens")]
    pub mutable_screens: Vec<String>,
    /// Screens created on startup when no layout exists yet.
    #[serde(default = "default_screens")]
    pub default_screens: Vec<String>,
    #[serde(default = "default_layout")]
    pub default_layout: String,
}

fn default_screens() -> Vec<String> {
    vec!["WaveScreen".into(), "customerTestimonials".into()]
}
fn default_layout() -> String {
    "Default".into()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mutable_screens: default_screens(),
            default_screens: default_screens(),
            default_layout: default_layout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageAppConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., KIOSK__DATABASE__URL)
            .add_source(
                Environment::with_prefix("KIOSK")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .with_list_parse_key("layout.mutable_screens")
                    .with_list_parse_key("layout.default_screens"),
            )
            .build()?;

        s.try_deserialize()
    }
}
