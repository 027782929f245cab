pub mod http;
pub mod profile_service;
pub mod static_profiles;

pub use http::HttpProfileService;
pub use profile_service::ProfileService;
pub use static_profiles::StaticProfileService;
