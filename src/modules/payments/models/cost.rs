use serde::{Deserialize, Serialize};

use crate::core::{Amount, Entity, EntityMeta, Extras};

/// A fee charged against a payment.
///
/// The link to the payment is logical only: the payment lists its cost ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub meta: EntityMeta,
    pub payment_id: String,
    pub amount: Option<Amount>,
    pub description: String,
    pub extras: Extras,
}

impl Entity for Cost {
    const KIND: &'static str = "Cost";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.payment_id.as_str(), self.description.as_str()]
    }
}
