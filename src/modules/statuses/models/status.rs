// Polymorphic lifecycle status shared by payments, prompts and payment links.
//
// A status is the pair (state, status code) plus free-form extras. Every
// transition writes a new row; the current status of an entity is the most
// recently written row for its (entity id, entity type) pair.

use serde::{Deserialize, Serialize};

use crate::core::{AppError, Entity, EntityMeta, Extras, Result, TenancyContext};

/// Coarse lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Created,
    Checked,
    Active,
    Inactive,
    Deleted,
}

impl State {
    pub fn as_i32(self) -> i32 {
        match self {
            State::Created => 0,
            State::Checked => 1,
            State::Active => 2,
            State::Inactive => 3,
            State::Deleted => 4,
        }
    }
}

impl TryFrom<i32> for State {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(State::Created),
            1 => Ok(State::Checked),
            2 => Ok(State::Active),
            3 => Ok(State::Inactive),
            4 => Ok(State::Deleted),
            other => Err(AppError::invalid_argument(format!("Unknown state {}", other))),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Created => write!(f, "created"),
            State::Checked => write!(f, "checked"),
            State::Active => write!(f, "active"),
            State::Inactive => write!(f, "inactive"),
            State::Deleted => write!(f, "deleted"),
        }
    }
}

/// Fine-grained progress code within a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Unknown,
    Queued,
    InProcess,
    Failed,
    Successful,
    PartiallySettled,
}

impl StatusCode {
    pub fn as_i32(self) -> i32 {
        match self {
            StatusCode::Unknown => 0,
            StatusCode::Queued => 1,
            StatusCode::InProcess => 2,
            StatusCode::Failed => 3,
            StatusCode::Successful => 4,
            StatusCode::PartiallySettled => 5,
        }
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(StatusCode::Unknown),
            1 => Ok(StatusCode::Queued),
            2 => Ok(StatusCode::InProcess),
            3 => Ok(StatusCode::Failed),
            4 => Ok(StatusCode::Successful),
            5 => Ok(StatusCode::PartiallySettled),
            other => Err(AppError::invalid_argument(format!(
                "Unknown status code {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusCode::Unknown => write!(f, "unknown"),
            StatusCode::Queued => write!(f, "queued"),
            StatusCode::InProcess => write!(f, "in_process"),
            StatusCode::Failed => write!(f, "failed"),
            StatusCode::Successful => write!(f, "successful"),
            StatusCode::PartiallySettled => write!(f, "partially_settled"),
        }
    }
}

/// Kinds of entity that carry a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Payment,
    Prompt,
    PaymentLink,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Payment => "payment",
            EntityType::Prompt => "prompt",
            EntityType::PaymentLink => "payment_link",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(AppError::invalid_argument("entity type is required")),
            "payment" => Ok(EntityType::Payment),
            "prompt" => Ok(EntityType::Prompt),
            "payment_link" => Ok(EntityType::PaymentLink),
            other => Err(AppError::invalid_argument(format!(
                "Unknown entity type '{}'",
                other
            ))),
        }
    }
}

/// One recorded status transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub meta: EntityMeta,
    pub entity_id: String,
    pub entity_type: EntityType,
    pub state: State,
    pub status: StatusCode,
    pub extras: Extras,
}

impl Status {
    /// A new transition row with a freshly generated id
    pub fn new(
        context: &TenancyContext,
        entity_id: impl Into<String>,
        entity_type: EntityType,
        state: State,
        status: StatusCode,
        extras: Extras,
    ) -> Self {
        Self {
            meta: EntityMeta::new(None, context),
            entity_id: entity_id.into(),
            entity_type,
            state,
            status,
            extras,
        }
    }

    pub fn is(&self, state: State, status: StatusCode) -> bool {
        self.state == state && self.status == status
    }
}

impl Entity for Status {
    const KIND: &'static str = "Status";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.entity_id.as_str()]
    }
}

/// What callers see of an entity's current status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Id of the entity the status belongs to
    pub id: String,
    pub state: State,
    pub status: StatusCode,
    #[serde(default)]
    pub extras: Extras,
}

impl StatusResponse {
    pub fn new(id: impl Into<String>, state: State, status: StatusCode, extras: Extras) -> Self {
        Self {
            id: id.into(),
            state,
            status,
            extras,
        }
    }
}

impl From<&Status> for StatusResponse {
    fn from(status: &Status) -> Self {
        Self {
            id: status.entity_id.clone(),
            state: status.state,
            status: status.status,
            extras: status.extras.clone(),
        }
    }
}

impl From<Status> for StatusResponse {
    fn from(status: Status) -> Self {
        Self {
            id: status.entity_id,
            state: status.state,
            status: status.status,
            extras: status.extras,
        }
    }
}
