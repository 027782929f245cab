use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::super::models::EventEnvelope;
use super::dispatcher::EventDispatcher;
use super::queue::ShardReceiver;

/// How often and how patiently a failed event is retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total delivery attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before attempt `attempt + 1`, doubling each time
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

/// One consumer task per queue shard
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl WorkerPool {
    pub fn start(
        receivers: Vec<ShardReceiver>,
        dispatcher: Arc<EventDispatcher>,
        policy: RetryPolicy,
    ) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);

        let handles = receivers
            .into_iter()
            .enumerate()
            .map(|(shard, rx)| {
                tokio::spawn(run_worker(
                    shard,
                    rx,
                    Arc::clone(&dispatcher),
                    policy,
                    shutdown_rx.clone(),
                ))
            })
            .collect::<Vec<_>>();

        info!(workers = handles.len(), "Event worker pool started");
        Self { handles, shutdown }
    }

    /// Stop accepting new events, then finish everything already queued
    ///
    /// Each worker closes its producer lane and drains both lanes, including
    /// chain steps emitted while draining, before it exits.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Event worker panicked");
            }
        }
        info!("Event worker pool stopped");
    }
}

async fn run_worker(
    shard: usize,
    mut rx: ShardReceiver,
    dispatcher: Arc<EventDispatcher>,
    policy: RetryPolicy,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            envelope = rx.recv() => {
                match envelope {
                    Some(envelope) => deliver(shard, &envelope, &dispatcher, policy).await,
                    None => break,
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    drain(shard, &mut rx, &dispatcher, policy).await;
                    break;
                }
            }
        }
    }

    debug!(shard, "Event worker exiting");
}

/// Deliver whatever is still buffered on the shard
async fn drain(
    shard: usize,
    rx: &mut ShardReceiver,
    dispatcher: &EventDispatcher,
    policy: RetryPolicy,
) {
    rx.close_producers();

    let mut drained = 0;
    while let Some(envelope) = rx.try_recv() {
        deliver(shard, &envelope, dispatcher, policy).await;
        drained += 1;
    }

    if drained > 0 {
        info!(shard, drained, "Drained queued events on shutdown");
    }
}

/// Handle one event, retrying in place so later events for the same entity
/// wait behind it
async fn deliver(
    shard: usize,
    envelope: &EventEnvelope,
    dispatcher: &EventDispatcher,
    policy: RetryPolicy,
) {
    let mut attempt = 1;

    loop {
        match dispatcher.dispatch(envelope).await {
            Ok(()) => return,
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    shard,
                    event = envelope.name(),
                    event_id = %envelope.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Event failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(
                    shard,
                    event = envelope.name(),
                    event_id = %envelope.id,
                    entity = envelope.event.entity_key(),
                    attempt,
                    error = %e,
                    "Event dropped"
                );
                return;
            }
        }
    }
}
