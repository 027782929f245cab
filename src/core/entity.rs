use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::context::TenancyContext;

/// Free-form key/value metadata stored alongside typed columns
pub type Extras = HashMap<String, String>;

/// Identity, timestamps and tenancy shared by every persisted entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EntityMeta {
    pub id: String,
    pub tenant_id: String,
    pub partition_id: String,
    pub access_id: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl EntityMeta {
    /// Metadata for a new entity, keeping a client-assigned id when present
    pub fn new(id: Option<String>, context: &TenancyContext) -> Self {
        let now = Utc::now();
        let id = id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_id);

        Self {
            id,
            tenant_id: context.tenant_id.clone(),
            partition_id: context.partition_id.clone(),
            access_id: context.access_id.clone(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// Generate a fresh entity id
///
/// Ids are time-ordered UUIDs so that rows written later sort later.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// Common accessors used by the repositories
pub trait Entity: Clone + Send + Sync + 'static {
    /// Entity name used in error messages
    const KIND: &'static str;

    fn meta(&self) -> &EntityMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }

    /// Text matched by case-insensitive substring search
    fn search_text(&self) -> Vec<&str>;
}
