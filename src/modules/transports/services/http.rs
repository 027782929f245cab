use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::transport_trait::Transport;
use crate::core::{AppError, Result};

/// Posts JSON payloads to `http`/`https` addresses
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn publish(&self, address: &str, payload: &Value) -> Result<()> {
        let response = self
            .client
            .post(address)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::transport(format!("POST {} failed: {}", address, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::transport(format!(
                "POST {} returned {}: {}",
                address, status, body
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
