pub mod payment_link_repository;

pub use payment_link_repository::{MySqlPaymentLinkRepository, PaymentLinkRepository};
