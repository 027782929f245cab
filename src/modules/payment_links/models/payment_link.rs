use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Amount, AppError, Entity, EntityMeta, Extras, Result};

/// Someone a payment link is addressed to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// A shareable request for payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub meta: EntityMeta,
    pub name: String,
    pub description: String,

    /// Fixed amount; `None` together with `open_amount` lets the payer choose
    pub amount: Option<Amount>,
    pub open_amount: bool,

    pub sale_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,

    pub customers: Vec<Customer>,

    /// Channels to notify customers over (email, sms, ...)
    pub notifications: Vec<String>,

    pub external_reference: String,
    pub extras: Extras,
}

impl PaymentLink {
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_none() && !self.open_amount {
            return Err(AppError::invalid_argument(
                "payment link needs an amount or open_amount",
            ));
        }

        if let (Some(sale), Some(expiry)) = (self.sale_date, self.expiry_date) {
            if expiry <= sale {
                return Err(AppError::invalid_argument(
                    "payment link expiry_date must be after sale_date",
                ));
            }
        }

        Ok(())
    }
}

impl Entity for PaymentLink {
    const KIND: &'static str = "PaymentLink";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.external_reference.as_str()]
    }
}
