use serde::{Deserialize, Serialize};

use super::entity::EntityMeta;

/// Tenancy scope carried by every call and every event
///
/// Supplied by the caller (request headers) and stamped into the metadata of
/// every entity the call creates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenancyContext {
    pub tenant_id: String,
    pub partition_id: String,
    pub access_id: String,
}

impl TenancyContext {
    pub fn new(
        tenant_id: impl Into<String>,
        partition_id: impl Into<String>,
        access_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            partition_id: partition_id.into(),
            access_id: access_id.into(),
        }
    }

    /// Whether an entity stamped with `meta` lies inside this scope
    ///
    /// Tenant and partition must both match; the access principal does not
    /// restrict visibility.
    pub fn owns(&self, meta: &EntityMeta) -> bool {
        self.tenant_id == meta.tenant_id && self.partition_id == meta.partition_id
    }
}
