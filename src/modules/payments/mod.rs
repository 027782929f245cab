pub mod models;
pub mod repositories;

pub use models::{Cost, Direction, Identity, Payment, PaymentMessage};
pub use repositories::{
    CostRepository, MySqlCostRepository, MySqlPaymentRepository, PaymentRepository,
};
