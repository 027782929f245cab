pub mod http;
pub mod memory;
pub mod transport_service;
pub mod transport_trait;

pub use http::HttpTransport;
pub use memory::{InMemoryTransport, Publication};
pub use transport_service::TransportService;
pub use transport_trait::Transport;
