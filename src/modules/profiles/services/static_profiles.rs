use async_trait::async_trait;
use std::collections::HashMap;

use super::super::models::Profile;
use super::profile_service::ProfileService;
use crate::core::{AppError, Result};

/// Map-backed profile service for tests and local runs
#[derive(Debug, Clone, Default)]
pub struct StaticProfileService {
    profiles: HashMap<String, Profile>,
}

impl StaticProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }
}

#[async_trait]
impl ProfileService for StaticProfileService {
    async fn get_profile_by_id(&self, id: &str) -> Result<Profile> {
        self.profiles
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Profile '{}' not found", id)))
    }
}
