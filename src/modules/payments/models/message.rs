use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payment::{Identity, Payment};
use crate::core::{Extras, Money};

/// External representation of an outbound payment handed to a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMessage {
    pub id: String,
    pub reference_id: String,
    pub batch_id: String,
    pub transaction_id: String,
    pub sender: Identity,
    pub recipient: Identity,
    pub amount: Option<Money>,
    pub cost_ids: Vec<String>,
    pub route_id: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub extras: Extras,
}

impl From<&Payment> for PaymentMessage {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.meta.id.clone(),
            reference_id: payment.reference_id.clone(),
            batch_id: payment.batch_id.clone(),
            transaction_id: payment.transaction_id.clone(),
            sender: payment.sender.clone(),
            recipient: payment.recipient.clone(),
            amount: payment.amount.as_ref().map(|a| a.to_wire()),
            cost_ids: payment.cost_ids.clone(),
            route_id: payment.route_id.clone(),
            released_at: payment.released_at,
            extras: payment.extras.clone(),
        }
    }
}
