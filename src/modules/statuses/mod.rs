pub mod models;
pub mod repositories;
pub mod services;

pub use models::{EntityType, State, Status, StatusCode, StatusResponse};
pub use repositories::{MySqlStatusRepository, StatusRepository};
pub use services::StatusTracker;
