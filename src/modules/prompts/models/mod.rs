pub mod account;
pub mod prompt;

pub use account::Account;
pub use prompt::{Prompt, EXTRA_CURRENCY, EXTRA_PAYER_CONTACT, EXTRA_TRANSACTION_REF};
