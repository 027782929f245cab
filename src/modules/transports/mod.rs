pub mod services;

pub use services::{
    HttpTransport, InMemoryTransport, Publication, Transport, TransportService,
};
