use serde::{Deserialize, Serialize};

use crate::core::{AppError, Entity, EntityMeta, Result};

/// Direction(s) a route carries traffic in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteMode {
    /// Receive only
    #[serde(rename = "rx")]
    Receive,

    /// Transmit only
    #[serde(rename = "tx")]
    Transmit,

    /// Both directions
    #[serde(rename = "trx")]
    Both,
}

impl RouteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Receive => "rx",
            RouteMode::Transmit => "tx",
            RouteMode::Both => "trx",
        }
    }

    /// Whether a route in this mode can serve a request for `requested`
    pub fn serves(&self, requested: RouteMode) -> bool {
        *self == requested || *self == RouteMode::Both
    }
}

impl std::fmt::Display for RouteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rx" => Ok(RouteMode::Receive),
            "tx" => Ok(RouteMode::Transmit),
            "trx" => Ok(RouteMode::Both),
            other => Err(AppError::invalid_argument(format!(
                "Unknown route mode '{}'",
                other
            ))),
        }
    }
}

/// Kind of channel a route delivers over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    #[serde(rename = "any")]
    Any,

    /// Long-form channels (bank rails, cards, ...)
    #[serde(rename = "l")]
    LongForm,

    /// Short-form channels (phone numbers, short codes)
    #[serde(rename = "s")]
    ShortForm,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Any => "any",
            RouteType::LongForm => "l",
            RouteType::ShortForm => "s",
        }
    }

    /// Whether a route of this type accepts payments hinted as `hint`
    pub fn accepts(&self, hint: RouteType) -> bool {
        *self == RouteType::Any || *self == hint
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(RouteType::Any),
            "l" => Ok(RouteType::LongForm),
            "s" => Ok(RouteType::ShortForm),
            other => Err(AppError::invalid_argument(format!(
                "Unknown route type '{}'",
                other
            ))),
        }
    }
}

/// A configured transport path; scoped to the partition in its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub meta: EntityMeta,
    pub name: String,
    pub description: String,
    pub mode: RouteMode,
    pub route_type: RouteType,

    /// Transport address payments are queued on, e.g. `https://...` or `mem://...`
    pub uri: String,
}

impl Route {
    pub fn partition_id(&self) -> &str {
        &self.meta.partition_id
    }

    pub fn matches(&self, partition_id: &str, mode: RouteMode, hint: RouteType) -> bool {
        self.partition_id() == partition_id
            && self.mode.serves(mode)
            && self.route_type.accepts(hint)
    }
}

impl Entity for Route {
    const KIND: &'static str = "Route";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}
