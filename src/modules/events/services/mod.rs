pub mod bus;
pub mod dispatcher;
pub mod memory;
pub mod queue;
pub mod worker_pool;

pub use bus::EventBus;
pub use dispatcher::{ChainStores, DispatcherTopics, EventDispatcher};
pub use memory::InMemoryEventBus;
pub use queue::{QueueEventBus, ShardReceiver};
pub use worker_pool::{RetryPolicy, WorkerPool};
