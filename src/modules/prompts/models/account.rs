use serde::{Deserialize, Serialize};

use crate::core::{Entity, EntityMeta, Extras};

/// Bank or merchant account, unique per (account number, country code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub meta: EntityMeta,
    pub account_number: String,
    pub country_code: String,
    pub name: String,
    pub extras: Extras,
}

impl Entity for Account {
    const KIND: &'static str = "Account";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.account_number.as_str(), self.name.as_str()]
    }
}
