pub mod cost_repository;
pub mod payment_repository;

pub use cost_repository::{CostRepository, MySqlCostRepository};
pub use payment_repository::{MySqlPaymentRepository, PaymentRepository};
