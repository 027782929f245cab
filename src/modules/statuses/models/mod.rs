pub mod status;

pub use status::{EntityType, State, Status, StatusCode, StatusResponse};
