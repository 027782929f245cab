pub mod cost;
pub mod message;
pub mod payment;

pub use cost::Cost;
pub use message::PaymentMessage;
pub use payment::{Direction, Identity, Payment};
