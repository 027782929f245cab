// Integration tests for the Send/Receive event chain
//
// Tests the payment lifecycle end to end against in-memory stores:
// 1. Receive accepts an inbound payment (Created, Queued)
// 2. payment.save persists it and starts routing
// 3. payment.in.route assigns a route (Active, Queued)
// 4. payment.in.queue publishes it on the route (Active, InProcess)

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use payflow::core::{AppError, Repository};
use payflow::modules::events::{Event, EventEnvelope};
use payflow::modules::routes::{RouteMode, RouteType};
use payflow::modules::statuses::{EntityType, State, StatusCode};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_inbound_payment_completes_chain() {
    let h = TestHarness::new();
    let route = h
        .add_route("inbound", RouteMode::Receive, RouteType::Any, "mem://inbound")
        .await;

    let mut request = payment_request();
    request.amount = Some(money("USD", 10, 0));
    request.cost = Some(money("USD", 1, 0));
    let payment_id = request.id.clone().unwrap();

    let response = h.engine.orchestrator.receive(&h.ctx, request).await.unwrap();

    assert_eq!(response.id, payment_id);
    assert_eq!(response.state, State::Created);
    assert_eq!(response.status, StatusCode::Queued);
    assert_eq!(h.bus.history().await, vec!["cost.save", "payment.save"]);

    h.settle().await;

    let current = h.current(&payment_id, EntityType::Payment).await;
    assert!(current.is(State::Active, StatusCode::InProcess));

    assert_eq!(
        h.bus.history().await,
        vec![
            "cost.save",
            "payment.save",
            "payment.in.route",
            "payment.in.queue"
        ]
    );

    let payment = h.payment(&payment_id).await;
    assert!(!payment.outbound);
    assert_eq!(payment.route_id.as_deref(), Some(route.meta.id.as_str()));
    assert_eq!(payment.amount.as_ref().unwrap().value, dec!(10));
    assert_eq!(payment.amount.as_ref().unwrap().currency, "USD");

    // Inbound payments travel as the stored entity
    let published = h.transport.published_to("mem://inbound").await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload["meta"]["id"], payment_id.as_str());
}

#[tokio::test]
async fn test_cost_is_saved_and_linked() {
    let h = TestHarness::new();
    h.add_route("inbound", RouteMode::Receive, RouteType::Any, "mem://inbound")
        .await;

    let mut request = payment_request();
    request.cost = Some(money("KES", 25, 500_000_000));
    let payment_id = request.id.clone().unwrap();

    h.engine.orchestrator.receive(&h.ctx, request).await.unwrap();
    h.settle().await;

    let payment = h.payment(&payment_id).await;
    assert_eq!(payment.cost_ids.len(), 1);

    let cost = h.costs.get_by_id(&payment.cost_ids[0]).await.unwrap();
    assert_eq!(cost.payment_id, payment_id);
    assert_eq!(cost.amount.unwrap().value, dec!(25.5));
}

#[tokio::test]
async fn test_send_defaults_to_outbound_and_waits_for_release() {
    let h = TestHarness::new();
    h.add_route("outbound", RouteMode::Transmit, RouteType::Any, "mem://outbound")
        .await;

    let request = payment_request();
    let payment_id = request.id.clone().unwrap();

    let response = h.engine.orchestrator.send(&h.ctx, request).await.unwrap();
    assert_eq!(response.state, State::Created);
    assert_eq!(response.status, StatusCode::Queued);

    h.settle().await;

    let current = h.current(&payment_id, EntityType::Payment).await;
    assert!(current.is(State::Checked, StatusCode::Queued));
    assert_eq!(h.bus.count("payment.out.route").await, 0);
    assert!(h.transport.published().await.is_empty());
    assert!(h.payment(&payment_id).await.outbound);
}

#[tokio::test]
async fn test_send_with_outbound_false_is_routed_inbound() {
    let h = TestHarness::new();
    h.add_route("inbound", RouteMode::Receive, RouteType::Any, "mem://inbound")
        .await;

    let mut request = payment_request();
    request.outbound = Some(false);
    let payment_id = request.id.clone().unwrap();

    h.engine.orchestrator.send(&h.ctx, request).await.unwrap();
    h.settle().await;

    assert_eq!(h.bus.count("payment.in.route").await, 1);
    let current = h.current(&payment_id, EntityType::Payment).await;
    assert!(current.is(State::Active, StatusCode::InProcess));
}

#[tokio::test]
async fn test_zero_amount_is_left_unset() {
    let h = TestHarness::new();

    let mut request = payment_request();
    request.amount = Some(money("USD", 0, 0));
    request.cost = None;
    let payment_id = request.id.clone().unwrap();

    h.engine.orchestrator.send(&h.ctx, request).await.unwrap();
    h.settle().await;

    let payment = h.payment(&payment_id).await;
    assert!(payment.amount.is_none());
    assert!(payment.cost_ids.is_empty());
    assert_eq!(h.bus.count("cost.save").await, 0);
}

#[tokio::test]
async fn test_malformed_amount_is_rejected() {
    let h = TestHarness::new();

    let mut request = payment_request();
    request.amount = Some(money("USD", 5, -3));

    let err = h.engine.orchestrator.send(&h.ctx, request).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert!(h.bus.history().await.is_empty());
}

#[tokio::test]
async fn test_generated_id_and_tenancy_stamp() {
    let h = TestHarness::new();

    let mut request = payment_request();
    request.id = None;

    let response = h.engine.orchestrator.send(&h.ctx, request).await.unwrap();
    assert!(!response.id.is_empty());

    h.settle().await;
    let payment = h.payment(&response.id).await;
    assert_eq!(payment.meta.tenant_id, "tenant-1");
    assert_eq!(payment.meta.partition_id, "partition-1");
    assert_eq!(payment.meta.access_id, "access-1");
}

#[tokio::test]
async fn test_redelivered_save_converges_to_one_row() {
    let h = TestHarness::new();

    let request = payment_request();
    let payment_id = request.id.clone().unwrap();
    h.engine.orchestrator.send(&h.ctx, request).await.unwrap();
    h.settle().await;

    let mut payment = h.payment(&payment_id).await;
    payment.reference_id = "REF-UPDATED".to_string();

    for _ in 0..2 {
        let envelope =
            EventEnvelope::new(h.ctx.clone(), Event::PaymentSave(payment.clone())).unwrap();
        h.engine.dispatcher.dispatch(&envelope).await.unwrap();
    }

    assert_eq!(h.payments.len().await, 1);
    assert_eq!(h.payment(&payment_id).await.reference_id, "REF-UPDATED");
}

#[tokio::test]
async fn test_inbound_publish_failure_surfaces_to_chain() {
    let h = TestHarness::new();
    h.add_route("inbound", RouteMode::Receive, RouteType::Any, "mem://inbound")
        .await;
    h.transport.set_failing(true);

    let request = payment_request();
    let payment_id = request.id.clone().unwrap();
    h.engine.orchestrator.receive(&h.ctx, request).await.unwrap();

    let failures = h.drain().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "payment.in.queue");
    assert!(matches!(failures[0].1, AppError::TransportFailure(_)));

    // The routed status is not rolled back
    let current = h.current(&payment_id, EntityType::Payment).await;
    assert!(current.is(State::Active, StatusCode::Queued));
}
