use async_trait::async_trait;
use serde_json::Value;

use crate::core::Result;

/// Delivers a payload to an external address
///
/// Implementations must be safe for concurrent use by independent chain
/// steps.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish `payload` to `address`
    ///
    /// # Errors
    /// * `TransportFailure` - the address could not be reached or refused the payload
    async fn publish(&self, address: &str, payload: &Value) -> Result<()>;

    /// Short name for logs
    fn name(&self) -> &str;
}
