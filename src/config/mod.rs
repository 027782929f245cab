use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub mod database;
pub mod server;

pub use database::{DatabaseConfig, StorageKind};
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub queue: QueueConfig,
    pub collaborators: CollaboratorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `json` switches the log formatter to JSON lines
    pub log_format: String,
}

/// Sharded event queue and worker retry settings
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    pub workers: usize,
    pub capacity: usize,
    pub max_attempts: u32,
    pub retry_base_ms: u64,
}

impl QueueConfig {
    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            capacity: 1024,
            max_attempts: 3,
            retry_base_ms: 200,
        }
    }
}

/// Addresses of external collaborators
#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorConfig {
    pub profile_service_url: String,
    pub prompt_topic_uri: String,
    pub payment_link_topic_uri: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let queue_defaults = QueueConfig::default();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            queue: QueueConfig {
                workers: parse_var("QUEUE_WORKERS", queue_defaults.workers)?,
                capacity: parse_var("QUEUE_CAPACITY", queue_defaults.capacity)?,
                max_attempts: parse_var("QUEUE_MAX_ATTEMPTS", queue_defaults.max_attempts)?,
                retry_base_ms: parse_var("QUEUE_RETRY_BASE_MS", queue_defaults.retry_base_ms)?,
            },
            collaborators: CollaboratorConfig {
                profile_service_url: env::var("PROFILE_SERVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:8081".to_string()),
                prompt_topic_uri: env::var("PROMPT_TOPIC_URI")
                    .unwrap_or_else(|_| "mem://initiate.prompt".to_string()),
                payment_link_topic_uri: env::var("PAYMENT_LINK_TOPIC_URI")
                    .unwrap_or_else(|_| "mem://create.payment.link".to_string()),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue.workers == 0 {
            return Err(AppError::Configuration(
                "QUEUE_WORKERS must be greater than 0".to_string(),
            ));
        }

        if self.queue.capacity == 0 {
            return Err(AppError::Configuration(
                "QUEUE_CAPACITY must be greater than 0".to_string(),
            ));
        }

        if self.queue.max_attempts == 0 {
            return Err(AppError::Configuration(
                "QUEUE_MAX_ATTEMPTS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.app.log_format.eq_ignore_ascii_case("json")
    }
}

/// Read and parse an optional variable, falling back to `default` when unset
pub(crate) fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", name))),
        Err(_) => Ok(default),
    }
}
