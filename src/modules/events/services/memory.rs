use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::super::models::{Event, EventEnvelope};
use super::bus::EventBus;
use super::dispatcher::EventDispatcher;
use crate::core::{AppError, Result, TenancyContext};

#[derive(Default)]
struct Inner {
    pending: VecDeque<EventEnvelope>,
    history: Vec<&'static str>,
}

/// FIFO bus that only moves when drained
///
/// Lets tests step the saga deterministically and inspect what was emitted.
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every event emitted so far, in order
    pub async fn history(&self) -> Vec<&'static str> {
        self.inner.lock().await.history.clone()
    }

    pub async fn count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .await
            .history
            .iter()
            .filter(|n| **n == name)
            .count()
    }

    pub async fn pending(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    /// Dispatch queued events, including ones emitted while draining, until
    /// the queue is empty
    ///
    /// Failures do not stop the drain; they are returned with the name of
    /// the event that caused them.
    pub async fn drain(&self, dispatcher: &EventDispatcher) -> Vec<(&'static str, AppError)> {
        let mut failures = Vec::new();

        loop {
            let next = self.inner.lock().await.pending.pop_front();
            let Some(envelope) = next else {
                break;
            };

            if let Err(e) = dispatcher.dispatch(&envelope).await {
                failures.push((envelope.name(), e));
            }
        }

        failures
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn emit(&self, context: &TenancyContext, event: Event) -> Result<()> {
        let envelope = EventEnvelope::new(context.clone(), event)?;
        let mut inner = self.inner.lock().await;
        inner.history.push(envelope.name());
        inner.pending.push_back(envelope);
        Ok(())
    }
}
