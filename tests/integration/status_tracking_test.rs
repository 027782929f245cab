// Integration tests for status tracking
//
// The current status of an entity is the most recently written row for its
// (entity id, entity type) pair. External collaborators overwrite it through
// StatusUpdate.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::collections::HashMap;
use std::sync::Arc;

use helpers::*;
use payflow::core::AppError;
use payflow::modules::orchestrator::models::StatusUpdateRequest;
use payflow::modules::routes::{RouteMode, RouteType};
use payflow::modules::statuses::{EntityType, State, StatusCode, StatusTracker};

fn update(id: &str, entity_type: &str, state: State, status: StatusCode) -> StatusUpdateRequest {
    StatusUpdateRequest {
        id: id.to_string(),
        entity_type: entity_type.to_string(),
        state,
        status,
        extras: HashMap::new(),
    }
}

#[tokio::test]
async fn test_latest_status_wins() {
    let h = TestHarness::new();
    let tracker = StatusTracker::new(Arc::new(h.statuses.clone()));

    tracker
        .record(&h.ctx, "A", EntityType::Payment, State::Active, StatusCode::Queued, HashMap::new())
        .await
        .unwrap();
    tracker
        .record(
            &h.ctx,
            "A",
            EntityType::Payment,
            State::Active,
            StatusCode::Successful,
            HashMap::new(),
        )
        .await
        .unwrap();

    let response = h.engine.orchestrator.status(&h.ctx, "A", "payment").await.unwrap();
    assert_eq!(response.id, "A");
    assert_eq!(response.status, StatusCode::Successful);
}

#[tokio::test]
async fn test_status_is_scoped_by_entity_type() {
    let h = TestHarness::new();
    let tracker = StatusTracker::new(Arc::new(h.statuses.clone()));

    tracker
        .record(
            &h.ctx,
            "shared",
            EntityType::Payment,
            State::Active,
            StatusCode::InProcess,
            HashMap::new(),
        )
        .await
        .unwrap();
    tracker
        .record(
            &h.ctx,
            "shared",
            EntityType::Prompt,
            State::Created,
            StatusCode::Queued,
            HashMap::new(),
        )
        .await
        .unwrap();

    let payment = h.engine.orchestrator.status(&h.ctx, "shared", "payment").await.unwrap();
    assert_eq!(payment.status, StatusCode::InProcess);

    let prompt = h.engine.orchestrator.status(&h.ctx, "shared", "prompt").await.unwrap();
    assert_eq!(prompt.status, StatusCode::Queued);

    let err = h
        .engine
        .orchestrator
        .status(&h.ctx, "shared", "payment_link")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_status_of_unknown_entity_is_not_found() {
    let h = TestHarness::new();

    let err = h.engine.orchestrator.status(&h.ctx, "nothing", "payment").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_status_rejects_unknown_entity_type() {
    let h = TestHarness::new();

    let err = h.engine.orchestrator.status(&h.ctx, "A", "invoice").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_status_update_overwrites_and_merges_extras() {
    let h = TestHarness::new();
    h.add_route("inbound", RouteMode::Receive, RouteType::Any, "mem://in")
        .await;

    let mut request = payment_request();
    request.extras.insert("channel".to_string(), "app".to_string());
    let payment_id = request.id.clone().unwrap();
    h.engine.orchestrator.receive(&h.ctx, request).await.unwrap();
    h.settle().await;

    let mut first = update(&payment_id, "payment", State::Active, StatusCode::PartiallySettled);
    first.extras.insert("gateway_ref".to_string(), "GW-1".to_string());
    h.engine.orchestrator.status_update(&h.ctx, first).await.unwrap();

    let mut second = update(&payment_id, "payment", State::Active, StatusCode::Successful);
    second.extras.insert("settled_by".to_string(), "gateway".to_string());
    let response = h.engine.orchestrator.status_update(&h.ctx, second).await.unwrap();

    assert_eq!(response.state, State::Active);
    assert_eq!(response.status, StatusCode::Successful);
    assert_eq!(response.extras.get("gateway_ref").map(String::as_str), Some("GW-1"));
    assert_eq!(response.extras.get("settled_by").map(String::as_str), Some("gateway"));

    let current = h.engine.orchestrator.status(&h.ctx, &payment_id, "payment").await.unwrap();
    assert_eq!(current, response);
}

#[tokio::test]
async fn test_status_update_requires_entity_type() {
    let h = TestHarness::new();

    let err = h
        .engine
        .orchestrator
        .status_update(&h.ctx, update("A", "", State::Active, StatusCode::Successful))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_status_update_requires_existing_status() {
    let h = TestHarness::new();

    let err = h
        .engine
        .orchestrator
        .status_update(&h.ctx, update("ghost", "payment", State::Active, StatusCode::Successful))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_status_save_event_is_stored() {
    use payflow::modules::events::{Event, EventEnvelope};
    use payflow::modules::statuses::Status;

    let h = TestHarness::new();
    let status = Status::new(
        &h.ctx,
        "link-1",
        EntityType::PaymentLink,
        State::Active,
        StatusCode::Successful,
        HashMap::new(),
    );

    let envelope = EventEnvelope::new(h.ctx.clone(), Event::StatusSave(status)).unwrap();
    h.engine.dispatcher.dispatch(&envelope).await.unwrap();

    let current = h.current("link-1", EntityType::PaymentLink).await;
    assert!(current.is(State::Active, StatusCode::Successful));
}

#[tokio::test]
async fn test_status_is_scoped_by_tenancy() {
    let h = TestHarness::new();
    let tracker = StatusTracker::new(Arc::new(h.statuses.clone()));

    tracker
        .record(&h.ctx, "A", EntityType::Payment, State::Active, StatusCode::Queued, HashMap::new())
        .await
        .unwrap();

    let outsider = tenancy("partition-2");
    let err = h
        .engine
        .orchestrator
        .status(&outsider, "A", "payment")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = h
        .engine
        .orchestrator
        .status_update(&outsider, update("A", "payment", State::Active, StatusCode::Successful))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let current = h.engine.orchestrator.status(&h.ctx, "A", "payment").await.unwrap();
    assert_eq!(current.status, StatusCode::Queued);
}
