// Integration tests for CreatePaymentLink
//
// A payment link is persisted, gets (Created, Queued) and is published on
// the create.payment.link topic. A failed publish flips the status to
// (Inactive, Failed) before the error surfaces.

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::Duration;
use helpers::*;
use payflow::core::{AppError, Repository};
use payflow::modules::events::services::dispatcher::EXTRA_ERROR;
use payflow::modules::statuses::{EntityType, State, StatusCode};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_payment_link_is_created_and_published() {
    let h = TestHarness::new();

    let request = payment_link_request();
    let link_id = request.id.clone().unwrap();

    let response = h
        .engine
        .orchestrator
        .create_payment_link(&h.ctx, request)
        .await
        .unwrap();
    assert_eq!(response.id, link_id);
    assert_eq!(response.state, State::Created);
    assert_eq!(response.status, StatusCode::Queued);

    h.settle().await;

    let link = h.payment_links.get_by_id(&link_id).await.unwrap();
    assert_eq!(link.amount.as_ref().unwrap().value, dec!(120));
    assert_eq!(link.customers.len(), 1);
    assert_eq!(link.meta.partition_id, "partition-1");

    let published = h.transport.published_to(PAYMENT_LINK_TOPIC).await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload["name"], "create.payment.link");
    assert_eq!(published[0].payload["payload"]["name"], "Conference ticket");

    let current = h.current(&link_id, EntityType::PaymentLink).await;
    assert!(current.is(State::Created, StatusCode::Queued));
}

#[tokio::test]
async fn test_open_amount_link_without_amount() {
    let h = TestHarness::new();

    let mut request = payment_link_request();
    request.amount = None;
    request.open_amount = true;
    let link_id = request.id.clone().unwrap();

    h.engine
        .orchestrator
        .create_payment_link(&h.ctx, request)
        .await
        .unwrap();
    h.settle().await;

    let link = h.payment_links.get_by_id(&link_id).await.unwrap();
    assert!(link.amount.is_none());
    assert!(link.open_amount);
}

#[tokio::test]
async fn test_link_needs_amount_or_open_amount() {
    let h = TestHarness::new();

    let mut request = payment_link_request();
    request.amount = None;
    request.open_amount = false;

    let err = h
        .engine
        .orchestrator
        .create_payment_link(&h.ctx, request)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert!(h.bus.history().await.is_empty());
}

#[tokio::test]
async fn test_link_expiry_must_follow_sale_date() {
    let h = TestHarness::new();

    let mut request = payment_link_request();
    let sale = request.sale_date.unwrap();
    request.expiry_date = Some(sale - Duration::hours(1));

    let err = h
        .engine
        .orchestrator
        .create_payment_link(&h.ctx, request)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_publish_failure_marks_link_failed() {
    let h = TestHarness::new();
    h.transport.set_failing(true);

    let request = payment_link_request();
    let link_id = request.id.clone().unwrap();
    h.engine
        .orchestrator
        .create_payment_link(&h.ctx, request)
        .await
        .unwrap();

    let failures = h.drain().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "payment_link.save");
    assert!(matches!(failures[0].1, AppError::TransportFailure(_)));

    let current = h.current(&link_id, EntityType::PaymentLink).await;
    assert!(current.is(State::Inactive, StatusCode::Failed));
    assert!(current.extras.contains_key(EXTRA_ERROR));

    // A redelivery after the gateway recovers converges back to queued
    h.transport.set_failing(false);
    let link = h.payment_links.get_by_id(&link_id).await.unwrap();
    let envelope = payflow::modules::events::EventEnvelope::new(
        h.ctx.clone(),
        payflow::modules::events::Event::PaymentLinkSave(link),
    )
    .unwrap();
    h.engine.dispatcher.dispatch(&envelope).await.unwrap();

    let current = h.current(&link_id, EntityType::PaymentLink).await;
    assert!(current.is(State::Created, StatusCode::Queued));
    assert_eq!(h.transport.published_to(PAYMENT_LINK_TOPIC).await.len(), 1);
}
