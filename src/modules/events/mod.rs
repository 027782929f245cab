pub mod models;
pub mod services;

pub use models::{Event, EventEnvelope};
pub use services::{
    ChainStores, DispatcherTopics, EventBus, EventDispatcher, InMemoryEventBus, QueueEventBus,
    RetryPolicy, ShardReceiver, WorkerPool,
};
