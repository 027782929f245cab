//! Payflow payment lifecycle orchestration
//!
//! Accepts send/receive/release/cancel requests for payments, drives each one
//! through an event chain (persist, route, queue) and tracks a polymorphic
//! status for payments, prompts and payment links.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::{Collaborators, Engine, Repositories};
pub use modules::events;
pub use modules::orchestrator;
pub use modules::payments;
pub use modules::statuses;
