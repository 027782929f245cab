use async_trait::async_trait;

use super::super::models::Profile;
use crate::core::Result;

/// Lookup of payer/payee profiles held by an external service
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// # Errors
    /// * `NotFound` - the service does not know the profile
    async fn get_profile_by_id(&self, id: &str) -> Result<Profile>;
}
