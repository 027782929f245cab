pub mod route_repository;

pub use route_repository::{MySqlRouteRepository, RouteRepository};
