use std::sync::Arc;

use super::super::models::{EntityType, State, Status, StatusCode};
use super::super::repositories::StatusRepository;
use crate::core::{Extras, Repository, Result, TenancyContext};

/// Records and reads the current lifecycle status of any tracked entity
#[derive(Clone)]
pub struct StatusTracker {
    repo: Arc<dyn StatusRepository>,
}

impl StatusTracker {
    pub fn new(repo: Arc<dyn StatusRepository>) -> Self {
        Self { repo }
    }

    /// Write a new status transition and return it
    ///
    /// Each call stores a row under a fresh id; the row becomes the entity's
    /// current status.
    pub async fn record(
        &self,
        context: &TenancyContext,
        entity_id: &str,
        entity_type: EntityType,
        state: State,
        status: StatusCode,
        extras: Extras,
    ) -> Result<Status> {
        let record = Status::new(context, entity_id, entity_type, state, status, extras);
        self.repo.save(&record).await?;

        tracing::debug!(
            entity_id = %entity_id,
            entity_type = %entity_type,
            state = %state,
            status = %status,
            "Status recorded"
        );

        Ok(record)
    }

    /// Store a status built elsewhere, such as one delivered by `status.save`
    pub async fn save(&self, status: &Status) -> Result<()> {
        self.repo.save(status).await
    }

    /// Current status of an entity owned by `scope`
    ///
    /// # Errors
    /// * `NotFound` - nothing was recorded for the entity in that scope
    pub async fn get_current(
        &self,
        scope: &TenancyContext,
        entity_id: &str,
        entity_type: EntityType,
    ) -> Result<Status> {
        self.repo.get_by_entity(scope, entity_id, entity_type).await
    }
}
