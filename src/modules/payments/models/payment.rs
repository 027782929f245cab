use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Amount, Entity, EntityMeta, Extras};

/// Who a payment is from or to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Profile kind (person, organisation, ...)
    #[serde(default)]
    pub profile_type: String,

    /// Profile identifier at the profile service
    #[serde(default)]
    pub profile_id: String,

    /// Contact of the profile the payment is addressed through
    #[serde(default)]
    pub contact_id: String,
}

/// Direction a payment travels relative to this system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

/// A monetary transfer moving through the routing chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub meta: EntityMeta,

    pub sender: Identity,
    pub recipient: Identity,

    /// `None` while the amount is pending
    pub amount: Option<Amount>,

    /// Costs charged against this payment
    pub cost_ids: Vec<String>,

    /// External reference supplied by the caller
    pub reference_id: String,
    pub batch_id: String,
    pub transaction_id: String,

    /// Route assigned by the router, once resolved
    pub route_id: Option<String>,

    pub outbound: bool,

    /// Set when an outbound payment is released for dispatch
    pub released_at: Option<DateTime<Utc>>,

    /// Set when an unreleased outbound payment is cancelled
    pub cancelled_at: Option<DateTime<Utc>>,

    pub extras: Extras,
}

impl Payment {
    pub fn direction(&self) -> Direction {
        if self.outbound {
            Direction::Outbound
        } else {
            Direction::Inbound
        }
    }

    pub fn is_released(&self) -> bool {
        self.released_at.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }

    /// Mark as released; returns false when it already was
    pub fn release(&mut self) -> bool {
        if self.is_released() {
            return false;
        }
        self.released_at = Some(Utc::now());
        self.meta.touch();
        true
    }

    /// Mark as cancelled; returns false when it already was
    pub fn cancel(&mut self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.cancelled_at = Some(Utc::now());
        self.meta.touch();
        true
    }

    pub fn assign_route(&mut self, route_id: impl Into<String>) {
        self.route_id = Some(route_id.into());
        self.meta.touch();
    }
}

impl Entity for Payment {
    const KIND: &'static str = "Payment";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.meta.id.as_str(),
            self.reference_id.as_str(),
            self.transaction_id.as_str(),
            self.batch_id.as_str(),
        ]
    }
}
