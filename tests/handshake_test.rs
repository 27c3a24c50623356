use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use quillcli::{
    quill::auth::wait_for_completion,
    types::{HandshakeSlot, OAUTH_RESULT_TYPE, OauthResult},
};

#[test]
fn test_oauth_result_success_and_failure() {
    let ok = OauthResult::success();
    assert_eq!(ok.kind, OAUTH_RESULT_TYPE);
    assert!(ok.is_success());

    let failed = OauthResult::failure("access denied");
    assert_eq!(failed.kind, OAUTH_RESULT_TYPE);
    assert!(!failed.is_success());
    assert_eq!(failed.message, "access denied");
}

#[test]
fn test_exchange_guard_fires_once() {
    let mut slot = HandshakeSlot::default();

    // First delivery runs the exchange, a re-delivered redirect does not
    assert!(slot.begin_exchange());
    assert!(!slot.begin_exchange());
    assert!(!slot.begin_exchange());
}

#[test]
fn test_first_published_message_wins() {
    let mut slot = HandshakeSlot::default();

    slot.publish(OauthResult::success());
    slot.publish(OauthResult::failure("late duplicate"));

    let outcome = slot.take_outcome().unwrap();
    assert!(outcome.is_success());

    // A taken message is gone; the duplicate cannot complete a second time
    assert!(slot.take_outcome().is_none());
}

#[tokio::test]
async fn test_wait_returns_published_outcome() {
    let slot = Arc::new(Mutex::new(HandshakeSlot::default()));

    // Publish from the "callback" side shortly after the wait starts
    let publisher = Arc::clone(&slot);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        publisher.lock().await.publish(OauthResult::success());
    });

    let outcome = wait_for_completion(Arc::clone(&slot), Duration::from_secs(5)).await;
    assert!(outcome.unwrap().is_success());
}

#[tokio::test]
async fn test_abandoned_attempt_times_out_silently() {
    let slot = Arc::new(Mutex::new(HandshakeSlot::default()));

    // Nobody ever publishes: the wait ends with no outcome, which the login
    // flow treats as a cancellation rather than an error.
    let outcome = wait_for_completion(Arc::clone(&slot), Duration::from_millis(700)).await;
    assert!(outcome.is_none());

    // The slot is still empty afterwards
    assert!(slot.lock().await.take_outcome().is_none());
}

#[tokio::test]
async fn test_late_message_is_not_redelivered_to_next_attempt() {
    let slot = Arc::new(Mutex::new(HandshakeSlot::default()));

    slot.lock().await.publish(OauthResult::failure("expired code"));
    let outcome = wait_for_completion(Arc::clone(&slot), Duration::from_secs(5)).await;
    assert_eq!(outcome.unwrap().message, "expired code");

    // A fresh wait on the same slot sees nothing
    let outcome = wait_for_completion(slot, Duration::from_millis(700)).await;
    assert!(outcome.is_none());
}
