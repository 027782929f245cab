use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::super::models::Profile;
use super::profile_service::ProfileService;
use crate::core::{AppError, Result};

/// Profile service client speaking JSON over HTTP
pub struct HttpProfileService {
    client: Client,
    base_url: String,
}

impl HttpProfileService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/profiles/{id}` with the id encoded as a single path segment
    fn profile_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid profile service URL: {}", e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                AppError::Configuration(format!(
                    "Profile service URL cannot take a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("profiles")
            .push(id);

        Ok(url)
    }
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn get_profile_by_id(&self, id: &str) -> Result<Profile> {
        let url = self.profile_url(id)?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!("Profile '{}' not found", id)));
        }

        let response = response.error_for_status()?;
        Ok(response.json::<Profile>().await?)
    }
}
