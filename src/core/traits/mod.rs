pub mod repository;

pub use repository::{contains_pattern, Repository};
