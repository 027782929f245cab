// Integration tests for the queued event chain
//
// Runs the engine the way the binary does: a sharded QueueEventBus consumed
// by a WorkerPool that retries failed events in place.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::*;
use payflow::core::{EntityMeta, Repository};
use payflow::modules::events::{
    DispatcherTopics, QueueEventBus, RetryPolicy, ShardReceiver, WorkerPool,
};
use payflow::modules::profiles::StaticProfileService;
use payflow::modules::routes::{Route, RouteMode, RouteType};
use payflow::modules::statuses::{State, StatusCode, StatusResponse};
use payflow::modules::transports::{InMemoryTransport, TransportService};
use payflow::{Collaborators, Engine, Repositories};

struct QueuedEngine {
    engine: Engine,
    transport: InMemoryTransport,
    workers: WorkerPool,
}

async fn start(policy: RetryPolicy) -> QueuedEngine {
    start_with(policy, 2, 64).await
}

async fn start_with(policy: RetryPolicy, shards: usize, capacity: usize) -> QueuedEngine {
    let (engine, transport, receivers) = build(shards, capacity).await;
    let workers = WorkerPool::start(receivers, Arc::clone(&engine.dispatcher), policy);

    QueuedEngine {
        engine,
        transport,
        workers,
    }
}

/// An engine over a queue with no workers consuming it yet
async fn build(shards: usize, capacity: usize) -> (Engine, InMemoryTransport, Vec<ShardReceiver>) {
    let repos = Repositories::in_memory();
    let route = Route {
        meta: EntityMeta::new(None, &tenancy("partition-1")),
        name: "inbound".to_string(),
        description: String::new(),
        mode: RouteMode::Receive,
        route_type: RouteType::Any,
        uri: "mem://inbound".to_string(),
    };
    repos.routes.save(&route).await.unwrap();

    let transport = InMemoryTransport::new();
    let collaborators = Collaborators {
        profiles: Arc::new(StaticProfileService::new()),
        transports: Arc::new(TransportService::new().with("mem", Arc::new(transport.clone()))),
        topics: DispatcherTopics {
            initiate_prompt: PROMPT_TOPIC.to_string(),
            create_payment_link: PAYMENT_LINK_TOPIC.to_string(),
        },
    };

    let (bus, receivers) = QueueEventBus::new(shards, capacity);
    let engine = Engine::build(repos, collaborators, Arc::new(bus));
    (engine, transport, receivers)
}

/// Poll until the payment reaches the wanted status or the deadline passes
async fn wait_for(
    engine: &Engine,
    payment_id: &str,
    state: State,
    status: StatusCode,
) -> StatusResponse {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let current = engine
            .orchestrator
            .status(&tenancy("partition-1"), payment_id, "payment")
            .await;
        if let Ok(current) = current {
            if current.state == state && current.status == status {
                return current;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "payment {} never reached {}/{}",
            payment_id,
            state,
            status
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn receive(engine: &Engine) -> String {
    let request = payment_request();
    let payment_id = request.id.clone().unwrap();
    engine
        .orchestrator
        .receive(&tenancy("partition-1"), request)
        .await
        .unwrap();
    payment_id
}

#[tokio::test]
async fn test_inbound_payment_completes_through_workers() {
    let q = start(RetryPolicy::default()).await;

    let payment_ids = [receive(&q.engine).await, receive(&q.engine).await];
    for payment_id in &payment_ids {
        wait_for(&q.engine, payment_id, State::Active, StatusCode::InProcess).await;
    }

    assert_eq!(q.transport.published_to("mem://inbound").await.len(), 2);
    q.workers.shutdown().await;
}

#[tokio::test]
async fn test_transient_publish_failure_is_retried() {
    let q = start(RetryPolicy::new(10, Duration::from_millis(20))).await;
    q.transport.set_failing(true);

    let payment_id = receive(&q.engine).await;
    wait_for(&q.engine, &payment_id, State::Active, StatusCode::Queued).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    q.transport.set_failing(false);

    wait_for(&q.engine, &payment_id, State::Active, StatusCode::InProcess).await;
    assert_eq!(q.transport.published_to("mem://inbound").await.len(), 1);
    q.workers.shutdown().await;
}

#[tokio::test]
async fn test_worker_survives_exhausted_retries() {
    let q = start(RetryPolicy::new(2, Duration::from_millis(5))).await;
    q.transport.set_failing(true);

    let dropped = receive(&q.engine).await;
    wait_for(&q.engine, &dropped, State::Active, StatusCode::Queued).await;
    // Long enough for both attempts to run out
    tokio::time::sleep(Duration::from_millis(100)).await;

    q.transport.set_failing(false);
    let next = receive(&q.engine).await;
    wait_for(&q.engine, &next, State::Active, StatusCode::InProcess).await;

    // The exhausted payment is left at its last recorded status
    let current = q
        .engine
        .orchestrator
        .status(&tenancy("partition-1"), &dropped, "payment")
        .await
        .unwrap();
    assert_eq!(current.state, State::Active);
    assert_eq!(current.status, StatusCode::Queued);
    q.workers.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_workers() {
    let q = start(RetryPolicy::default()).await;
    let payment_id = receive(&q.engine).await;
    wait_for(&q.engine, &payment_id, State::Active, StatusCode::InProcess).await;

    tokio::time::timeout(Duration::from_secs(2), q.workers.shutdown())
        .await
        .expect("worker pool did not stop");
}

#[tokio::test]
async fn test_burst_larger_than_capacity_completes() {
    let q = start_with(RetryPolicy::default(), 1, 4).await;

    let receives = (0..20).map(|_| receive(&q.engine));
    let payment_ids = tokio::time::timeout(
        Duration::from_secs(5),
        futures_util::future::join_all(receives),
    )
    .await
    .expect("producers stayed blocked on a full queue");

    for payment_id in &payment_ids {
        wait_for(&q.engine, payment_id, State::Active, StatusCode::InProcess).await;
    }
    assert_eq!(q.transport.published_to("mem://inbound").await.len(), 20);
    q.workers.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_finishes_queued_chains() {
    let (engine, transport, receivers) = build(2, 64).await;

    // Queue work before any worker runs
    let mut payment_ids = Vec::new();
    for _ in 0..10 {
        payment_ids.push(receive(&engine).await);
    }

    let workers = WorkerPool::start(
        receivers,
        Arc::clone(&engine.dispatcher),
        RetryPolicy::default(),
    );
    tokio::time::timeout(Duration::from_secs(5), workers.shutdown())
        .await
        .expect("worker pool did not stop");

    assert_eq!(transport.published_to("mem://inbound").await.len(), 10);
    for payment_id in &payment_ids {
        let current = engine
            .orchestrator
            .status(&tenancy("partition-1"), payment_id, "payment")
            .await
            .unwrap();
        assert_eq!(current.state, State::Active);
        assert_eq!(current.status, StatusCode::InProcess);
    }

    // Nothing is accepted once the pool has stopped
    let request = payment_request();
    assert!(engine
        .orchestrator
        .receive(&tenancy("partition-1"), request)
        .await
        .is_err());
}
