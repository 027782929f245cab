// Test data factory
//
// Request builders with unique ids so tests never collide.

use chrono::{Duration, Utc};
use payflow::core::Money;
use payflow::modules::orchestrator::models::{
    AccountRequest, PaymentLinkRequest, PaymentRequest, PromptRequest,
};
use payflow::modules::payment_links::Customer;
use payflow::modules::payments::Identity;
use payflow::modules::profiles::{Contact, Profile};
use uuid::Uuid;

pub fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

pub fn identity(profile_id: &str, contact_id: &str) -> Identity {
    Identity {
        profile_type: "individual".to_string(),
        profile_id: profile_id.to_string(),
        contact_id: contact_id.to_string(),
    }
}

pub fn money(currency: &str, units: i64, nanos: i32) -> Money {
    Money::new(currency, units, nanos)
}

pub fn payment_request() -> PaymentRequest {
    PaymentRequest {
        id: Some(unique_id("pay")),
        sender: identity("sender-profile", "sender-contact"),
        recipient: identity("recipient-profile", "recipient-contact"),
        amount: Some(money("KES", 1500, 0)),
        cost: None,
        reference_id: unique_id("REF"),
        batch_id: String::new(),
        transaction_id: unique_id("TX"),
        route_id: None,
        outbound: None,
        extras: Default::default(),
    }
}

pub fn prompt_request() -> PromptRequest {
    PromptRequest {
        id: Some(unique_id("prompt")),
        source: identity("merchant-profile", "merchant-contact"),
        recipient: identity("payer-profile", "+254700000001"),
        amount: Some(money("KES", 250, 0)),
        account: AccountRequest {
            account_number: "ACC-001".to_string(),
            country_code: "ke".to_string(),
            name: "Main account".to_string(),
        },
        device_id: "device-1".to_string(),
        extras: Default::default(),
    }
}

pub fn payment_link_request() -> PaymentLinkRequest {
    let now = Utc::now();
    PaymentLinkRequest {
        id: Some(unique_id("link")),
        name: "Conference ticket".to_string(),
        description: "Two-day pass".to_string(),
        amount: Some(money("USD", 120, 0)),
        open_amount: false,
        sale_date: Some(now),
        expiry_date: Some(now + Duration::days(30)),
        customers: vec![Customer {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+15550000001".to_string(),
        }],
        notifications: vec!["email".to_string()],
        external_reference: unique_id("EXT"),
        extras: Default::default(),
    }
}

/// Profile whose contact is a phone number
pub fn phone_profile(profile_id: &str, contact_id: &str) -> Profile {
    Profile {
        id: profile_id.to_string(),
        contacts: vec![Contact {
            id: contact_id.to_string(),
            contact_type: "msisdn".to_string(),
            detail: "+254700000001".to_string(),
        }],
    }
}

/// Profile whose contact is an email address
pub fn email_profile(profile_id: &str, contact_id: &str) -> Profile {
    Profile {
        id: profile_id.to_string(),
        contacts: vec![Contact {
            id: contact_id.to_string(),
            contact_type: "email".to_string(),
            detail: "someone@example.com".to_string(),
        }],
    }
}
