pub mod route;

pub use route::{Route, RouteMode, RouteType};
