// Integration tests for InitiatePrompt
//
// A prompt gets a 6-character transaction reference, resolves (or creates)
// its account, and is published on the initiate.prompt topic for the
// gateway collaborator.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use payflow::core::{AppError, Repository};
use payflow::modules::events::services::dispatcher::EXTRA_ERROR;
use payflow::modules::prompts::AccountRepository;
use payflow::modules::prompts::models::{EXTRA_CURRENCY, EXTRA_PAYER_CONTACT, EXTRA_TRANSACTION_REF};
use payflow::modules::statuses::{EntityType, State, StatusCode};

#[tokio::test]
async fn test_prompt_is_published_with_reference() {
    let h = TestHarness::new();

    let request = prompt_request();
    let prompt_id = request.id.clone().unwrap();

    let response = h.engine.orchestrator.initiate_prompt(&h.ctx, request).await.unwrap();
    assert_eq!(response.id, prompt_id);
    assert_eq!(response.state, State::Created);
    assert_eq!(response.status, StatusCode::Queued);

    let reference = response.extras.get(EXTRA_TRANSACTION_REF).cloned().unwrap();
    assert_eq!(reference.len(), 6);

    h.settle().await;

    let prompt = h.prompts.get_by_id(&prompt_id).await.unwrap();
    assert_eq!(prompt.transaction_ref(), Some(reference.as_str()));
    assert_eq!(prompt.extras.get(EXTRA_CURRENCY).map(String::as_str), Some("KES"));
    assert_eq!(
        prompt.extras.get(EXTRA_PAYER_CONTACT).map(String::as_str),
        Some("+254700000001")
    );
    assert_eq!(prompt.country_code, "KE");

    let published = h.transport.published_to(PROMPT_TOPIC).await;
    assert_eq!(published.len(), 1);
    let message = &published[0].payload;
    assert_eq!(message["name"], "initiate.prompt");
    assert_eq!(message["context"]["partition_id"], "partition-1");
    assert_eq!(message["payload"]["meta"]["id"], prompt_id.as_str());

    let current = h.current(&prompt_id, EntityType::Prompt).await;
    assert!(current.is(State::Created, StatusCode::Queued));
    assert_eq!(current.extras.get(EXTRA_TRANSACTION_REF), Some(&reference));
}

#[tokio::test]
async fn test_prompt_creates_account_once() {
    let h = TestHarness::new();

    let first = prompt_request();
    let first_id = first.id.clone().unwrap();
    h.engine.orchestrator.initiate_prompt(&h.ctx, first).await.unwrap();
    h.settle().await;

    let second = prompt_request();
    let second_id = second.id.clone().unwrap();
    h.engine.orchestrator.initiate_prompt(&h.ctx, second).await.unwrap();
    h.settle().await;

    assert_eq!(h.accounts.len().await, 1);

    let account = h
        .accounts
        .get_by_account_number("ACC-001", "KE")
        .await
        .unwrap();
    assert_eq!(account.name, "Main account");

    for prompt_id in [first_id, second_id] {
        let prompt = h.prompts.get_by_id(&prompt_id).await.unwrap();
        assert_eq!(prompt.account_id.as_deref(), Some(account.meta.id.as_str()));
    }
}

#[tokio::test]
async fn test_prompt_requires_recipient_contact() {
    let h = TestHarness::new();

    let mut request = prompt_request();
    request.recipient.contact_id = "  ".to_string();

    let err = h.engine.orchestrator.initiate_prompt(&h.ctx, request).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert!(h.bus.history().await.is_empty());
}

#[tokio::test]
async fn test_prompt_requires_account() {
    let h = TestHarness::new();

    let mut request = prompt_request();
    request.account.account_number = String::new();

    let err = h.engine.orchestrator.initiate_prompt(&h.ctx, request).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_prompt_requires_currency() {
    let h = TestHarness::new();

    let mut request = prompt_request();
    request.amount = None;

    let err = h.engine.orchestrator.initiate_prompt(&h.ctx, request).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_prompt_publish_failure_marks_prompt_failed() {
    let h = TestHarness::new();
    h.transport.set_failing(true);

    let request = prompt_request();
    let prompt_id = request.id.clone().unwrap();
    h.engine.orchestrator.initiate_prompt(&h.ctx, request).await.unwrap();

    let failures = h.drain().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "prompt.save");
    assert!(matches!(failures[0].1, AppError::TransportFailure(_)));

    let current = h.current(&prompt_id, EntityType::Prompt).await;
    assert!(current.is(State::Inactive, StatusCode::Failed));
    assert!(current.extras.contains_key(EXTRA_ERROR));
    assert!(current.extras.contains_key(EXTRA_TRANSACTION_REF));

    // The prompt itself was persisted before the publish
    assert!(h.prompts.get_by_id(&prompt_id).await.is_ok());
}
