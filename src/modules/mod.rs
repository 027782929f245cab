pub mod events;
pub mod health;
pub mod orchestrator;
pub mod payment_links;
pub mod payments;
pub mod profiles;
pub mod prompts;
pub mod routes;
pub mod statuses;
pub mod transports;
