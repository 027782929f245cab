use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use super::transport_trait::Transport;
use crate::core::{AppError, Result};

/// Routes publications to a transport by the address's URI scheme
#[derive(Clone, Default)]
pub struct TransportService {
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl TransportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport for a scheme such as `https` or `mem`
    pub fn register(&mut self, scheme: &str, transport: Arc<dyn Transport>) {
        self.transports.insert(scheme.to_ascii_lowercase(), transport);
    }

    pub fn with(mut self, scheme: &str, transport: Arc<dyn Transport>) -> Self {
        self.register(scheme, transport);
        self
    }

    /// Transport responsible for `address`
    pub fn resolve(&self, address: &str) -> Result<Arc<dyn Transport>> {
        let scheme = scheme_of(address)?;
        self.transports.get(&scheme).cloned().ok_or_else(|| {
            AppError::transport(format!("No transport registered for scheme '{}'", scheme))
        })
    }

    pub async fn publish(&self, address: &str, payload: &Value) -> Result<()> {
        let transport = self.resolve(address)?;

        match transport.publish(address, payload).await {
            Ok(()) => {
                debug!(transport = transport.name(), address = %address, "Payload published");
                Ok(())
            }
            Err(e) => {
                error!(
                    transport = transport.name(),
                    address = %address,
                    error = %e,
                    "Failed to publish payload"
                );
                Err(e)
            }
        }
    }
}

fn scheme_of(address: &str) -> Result<String> {
    match address.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {
            Ok(scheme.to_ascii_lowercase())
        }
        _ => Err(AppError::transport(format!(
            "Address '{}' has no URI scheme",
            address
        ))),
    }
}
