pub mod payment_link;

pub use payment_link::{Customer, PaymentLink};
