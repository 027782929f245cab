pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Route, RouteMode, RouteType};
pub use repositories::{MySqlRouteRepository, RouteRepository};
pub use services::Router;
