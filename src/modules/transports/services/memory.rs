use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::transport_trait::Transport;
use crate::core::{AppError, Result};

/// One payload handed to the in-memory transport
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub address: String,
    pub payload: Value,
}

/// Transport for `mem://` addresses that keeps everything it is given
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    published: Arc<Mutex<Vec<Publication>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn published(&self) -> Vec<Publication> {
        self.published.lock().await.clone()
    }

    pub async fn published_to(&self, address: &str) -> Vec<Publication> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|p| p.address == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn publish(&self, address: &str, payload: &Value) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::transport(format!("{} is unavailable", address)));
        }

        self.published.lock().await.push(Publication {
            address: address.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "mem"
    }
}
