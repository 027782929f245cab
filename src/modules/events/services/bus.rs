use async_trait::async_trait;

use super::super::models::Event;
use crate::core::{Result, TenancyContext};

/// Publishes lifecycle events for asynchronous handling
///
/// Emitting never runs the handler in-line; the event is queued and the
/// call returns.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// # Errors
    /// * `InvalidArgument` - the event payload failed validation
    /// * `TransportFailure` - the bus no longer accepts events
    async fn emit(&self, context: &TenancyContext, event: Event) -> Result<()>;

    /// Emit the next step of a chain from inside an event handler
    ///
    /// The handler may be running on the very worker that consumes the
    /// event, so this must never wait on queue capacity.
    async fn emit_next(&self, context: &TenancyContext, event: Event) -> Result<()> {
        self.emit(context, event).await
    }
}
