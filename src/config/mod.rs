//! # Configuration System
//!
//! YAML-backed configuration with explicit loading and validation. There is
//! no process-wide singleton: the loaded [`TaskrecConfig`] is passed to the
//! constructors that need it.

pub mod loader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use loader::ConfigManager;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse configuration: {message}")]
    Parse { message: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;

/// Root configuration mirroring `config/taskrec.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskrecConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_page")]
    pub default_page: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_pool")]
    pub pool: u32,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub addr: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub db: i64,
    /// Maximum number of ids tracked by the cache's eviction tracker.
    pub max_cache_size: usize,
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) if !password.is_empty() => {
                format!("redis://:{}@{}/{}", password, self.addr, self.db)
            }
            _ => format!("redis://{}/{}", self.addr, self.db),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagingConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

fn default_pool() -> u32 {
    5
}

fn default_operation_timeout_ms() -> u64 {
    2_000
}

fn default_channel_capacity() -> usize {
    256
}

impl TaskrecConfig {
    /// Reject configurations that would misbehave at runtime rather than
    /// falling back silently.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be non-zero"));
        }
        if self.server.default_page < 1 || self.server.default_page_size < 1 {
            return Err(invalid(
                "server.default_page and server.default_page_size must be >= 1",
            ));
        }
        if self.database.name.is_empty() || self.database.host.is_empty() {
            return Err(invalid("database.host and database.name are required"));
        }
        if self.database.pool == 0 {
            return Err(invalid("database.pool must be >= 1"));
        }
        if self.redis.addr.is_empty() {
            return Err(invalid("redis.addr is required"));
        }
        if self.redis.max_cache_size == 0 {
            return Err(invalid("redis.max_cache_size must be >= 1"));
        }
        if self.messaging.channel_capacity == 0 {
            return Err(invalid("messaging.channel_capacity must be >= 1"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigurationError {
    ConfigurationError::Invalid {
        message: message.to_string(),
    }
}
