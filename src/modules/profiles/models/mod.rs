pub mod profile;

pub use profile::{Contact, Profile};
