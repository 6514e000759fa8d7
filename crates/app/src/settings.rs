//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `SHOP__`-prefixed environment
//! variables (`SHOP__AUTH__SECRET`, `SHOP__CACHE__REDIS_URL`, ...).
//!
//! See `settings.example.toml` for the configuration.
use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use engine::CachePolicy;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

impl Server {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    /// In-process cache when absent.
    pub redis_url: Option<String>,
    pub ttl_secs: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl Cache {
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            ttl: Duration::from_secs(self.ttl_secs),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub secret: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub cache: Cache,
    pub auth: Auth,
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("app.level", "info")?
        .set_default("server.bind", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.request_timeout_ms", 5000)?
        .set_default("database.url", "sqlite:./coinshop.db?mode=rwc")?
        .set_default("database.max_connections", 10)?
        .set_default("cache.ttl_secs", 1800)?
        .set_default("cache.read_timeout_ms", 2000)?
        .set_default("cache.write_timeout_ms", 3000)?
        .set_default("auth.token_ttl_secs", 86400)
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = with_defaults()?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SHOP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
