use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Extras, Money};
use crate::modules::payment_links::Customer;
use crate::modules::payments::{Identity, Payment};
use crate::modules::statuses::{State, StatusCode, StatusResponse};

/// Send or Receive request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Client-assigned id; generated when absent
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub sender: Identity,
    #[serde(default)]
    pub recipient: Identity,

    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub cost: Option<Money>,

    #[serde(default)]
    pub reference_id: String,
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub transaction_id: String,

    #[serde(default)]
    pub route_id: Option<String>,

    /// Send treats a missing flag as outbound; Receive ignores it
    #[serde(default)]
    pub outbound: Option<bool>,

    #[serde(default)]
    pub extras: Extras,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub id: String,
    #[serde(default)]
    pub entity_type: String,
    pub state: State,
    pub status: StatusCode,
    #[serde(default)]
    pub extras: Extras,
}

/// Lookup by exact id, or substring search with `q`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "q")]
    pub query: Option<String>,
}

/// A payment joined with its current status, when it has one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub payment: Payment,
    pub status: Option<StatusResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRequest {
    pub account_number: String,
    pub country_code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Identity,
    #[serde(default)]
    pub recipient: Identity,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub account: AccountRequest,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub extras: Extras,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentLinkRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub open_amount: bool,
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub notifications: Vec<String>,
    #[serde(default)]
    pub external_reference: String,
    #[serde(default)]
    pub extras: Extras,
}
