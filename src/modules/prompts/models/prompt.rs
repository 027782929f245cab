use serde::{Deserialize, Serialize};

use crate::core::{Amount, Entity, EntityMeta, Extras};
use crate::modules::payments::models::Identity;

/// Extras key carrying the correlation reference sent to the payer
pub const EXTRA_TRANSACTION_REF: &str = "transaction_ref";
pub const EXTRA_CURRENCY: &str = "currency";
pub const EXTRA_PAYER_CONTACT: &str = "payer_contact";

/// Request pushed to a payer's device asking them to authorise a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub meta: EntityMeta,
    pub source: Identity,
    pub recipient: Identity,
    pub amount: Option<Amount>,

    /// Natural key of the account the payment lands in
    pub account_number: String,
    pub country_code: String,
    #[serde(default)]
    pub account_name: String,

    /// Set once the account has been looked up or created
    pub account_id: Option<String>,

    pub device_id: String,
    pub extras: Extras,
}

impl Prompt {
    pub fn transaction_ref(&self) -> Option<&str> {
        self.extras.get(EXTRA_TRANSACTION_REF).map(String::as_str)
    }

    /// Extras keys that must be present before the prompt is dispatched
    pub fn missing_dispatch_extras(&self) -> Vec<&'static str> {
        [EXTRA_TRANSACTION_REF, EXTRA_CURRENCY, EXTRA_PAYER_CONTACT]
            .into_iter()
            .filter(|key| self.extras.get(*key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }
}

impl Entity for Prompt {
    const KIND: &'static str = "Prompt";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.meta.id.as_str(), self.account_number.as_str()];
        if let Some(reference) = self.transaction_ref() {
            text.push(reference);
        }
        text
    }
}
