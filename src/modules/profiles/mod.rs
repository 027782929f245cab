pub mod models;
pub mod services;

pub use models::{Contact, Profile};
pub use services::{HttpProfileService, ProfileService, StaticProfileService};
