pub mod status_repository;

pub use status_repository::{MySqlStatusRepository, StatusRepository};
