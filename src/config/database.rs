use crate::core::{AppError, Result};
use serde::Deserialize;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::parse_var;

/// Where entities are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    MySql,
    Memory,
}

impl FromStr for StorageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mysql" => Ok(StorageKind::MySql),
            "memory" => Ok(StorageKind::Memory),
            other => Err(AppError::Configuration(format!(
                "Unknown STORAGE '{}', expected mysql or memory",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub storage: StorageKind,
    /// Empty when running on in-memory storage
    pub url: String,
    pub pool_size: u32,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let storage: StorageKind = env::var("STORAGE").unwrap_or_default().parse()?;

        let url = match (storage, env::var("DATABASE_URL")) {
            (_, Ok(url)) => url,
            (StorageKind::Memory, Err(_)) => String::new(),
            (StorageKind::MySql, Err(_)) => {
                return Err(AppError::Configuration("DATABASE_URL not set".to_string()))
            }
        };

        Ok(DatabaseConfig {
            storage,
            url,
            pool_size: parse_var("DATABASE_POOL_SIZE", 5)?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 20)?,
        })
    }

    /// Create a MySQL connection pool
    pub async fn create_pool(&self) -> Result<MySqlPool> {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.pool_size.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(&self.url)
            .await
            .map_err(AppError::Database)
    }
}
