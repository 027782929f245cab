pub mod models;
pub mod repositories;

pub use models::{Customer, PaymentLink};
pub use repositories::{MySqlPaymentLinkRepository, PaymentLinkRepository};
