pub mod event;

pub use event::{Event, EventEnvelope, ExternalEvent};
