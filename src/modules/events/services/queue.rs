use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::mpsc;

use super::super::models::{Event, EventEnvelope};
use super::bus::EventBus;
use crate::core::{AppError, Result, TenancyContext};

/// Sharded channel bus feeding the worker pool
///
/// Events are assigned a shard by their entity key, so everything that
/// happens to one payment is handled by one worker.
///
/// Each shard has two lanes. Callers outside the chain use the bounded
/// producer lane and wait when it is full. Follow-up steps emitted by a
/// handler use the unbounded chain lane, which the worker drains first, so a
/// worker never waits on its own shard.
#[derive(Clone)]
pub struct QueueEventBus {
    producers: Vec<mpsc::Sender<EventEnvelope>>,
    chains: Vec<mpsc::UnboundedSender<EventEnvelope>>,
}

/// Consuming end of one shard
pub struct ShardReceiver {
    producer: mpsc::Receiver<EventEnvelope>,
    chain: mpsc::UnboundedReceiver<EventEnvelope>,
}

impl ShardReceiver {
    /// Next event, chain steps first
    ///
    /// Returns `None` once both lanes are closed and empty.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        tokio::select! {
            biased;
            Some(envelope) = self.chain.recv() => Some(envelope),
            Some(envelope) = self.producer.recv() => Some(envelope),
            else => None,
        }
    }

    /// Next already-buffered event without waiting
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        self.chain
            .try_recv()
            .ok()
            .or_else(|| self.producer.try_recv().ok())
    }

    /// Refuse new events from producers; buffered ones stay readable
    ///
    /// The chain lane stays open so that draining can finish in-flight
    /// chains.
    pub fn close_producers(&mut self) {
        self.producer.close();
    }
}

impl QueueEventBus {
    /// Create the bus and the receivers the worker pool consumes
    ///
    /// `capacity` bounds the producer lane of each shard.
    pub fn new(shards: usize, capacity: usize) -> (Self, Vec<ShardReceiver>) {
        let shards = shards.max(1);
        let mut producers = Vec::with_capacity(shards);
        let mut chains = Vec::with_capacity(shards);
        let mut receivers = Vec::with_capacity(shards);

        for _ in 0..shards {
            let (producer_tx, producer) = mpsc::channel(capacity.max(1));
            let (chain_tx, chain) = mpsc::unbounded_channel();
            producers.push(producer_tx);
            chains.push(chain_tx);
            receivers.push(ShardReceiver { producer, chain });
        }

        (Self { producers, chains }, receivers)
    }

    pub fn shard_count(&self) -> usize {
        self.producers.len()
    }

    pub fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.producers.len() as u64) as usize
    }

    fn closed(name: &str) -> AppError {
        AppError::transport(format!("event queue closed, dropped {}", name))
    }
}

#[async_trait]
impl EventBus for QueueEventBus {
    async fn emit(&self, context: &TenancyContext, event: Event) -> Result<()> {
        let envelope = EventEnvelope::new(context.clone(), event)?;
        let shard = self.shard_for(envelope.event.entity_key());
        let name = envelope.name();

        self.producers[shard]
            .send(envelope)
            .await
            .map_err(|_| Self::closed(name))?;

        tracing::trace!(event = name, shard, "Event queued");
        Ok(())
    }

    async fn emit_next(&self, context: &TenancyContext, event: Event) -> Result<()> {
        let envelope = EventEnvelope::new(context.clone(), event)?;
        let shard = self.shard_for(envelope.event.entity_key());
        let name = envelope.name();

        self.chains[shard]
            .send(envelope)
            .map_err(|_| Self::closed(name))?;

        tracing::trace!(event = name, shard, "Chain step queued");
        Ok(())
    }
}
