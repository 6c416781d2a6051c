use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bgdl_core::relay::{is_download_complete, CompletionRelay, ACTION_DOWNLOAD_COMPLETE};

/// Registers a counting closure on the relay and returns the counter.
fn register_counter(relay: &CompletionRelay) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    relay.set_callback(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    calls
}

#[test]
fn test_filter_matches_only_the_download_complete_action() {
    assert!(is_download_complete(ACTION_DOWNLOAD_COMPLETE));
    assert!(!is_download_complete(""));
    assert!(!is_download_complete("bgdl.action.NOTIFICATION_CLICKED"));
    // The match is exact, including case.
    assert!(!is_download_complete("bgdl.action.download_complete"));
}

#[test]
fn test_unarmed_relay_ignores_matching_broadcast() {
    let relay = CompletionRelay::new();
    // No callback registered — must be a silent no-op.
    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
}

#[test]
fn test_unarmed_relay_ignores_non_matching_broadcast() {
    let relay = CompletionRelay::new();
    relay.on_broadcast("bgdl.action.NOTIFICATION_CLICKED");
}

#[test]
fn test_non_matching_action_does_not_invoke_callback() {
    let relay = CompletionRelay::new();
    let calls = register_counter(&relay);

    relay.on_broadcast("bgdl.action.NOTIFICATION_CLICKED");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_matching_action_invokes_callback_exactly_once() {
    let relay = CompletionRelay::new();
    let calls = register_counter(&relay);

    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_every_matching_broadcast_invokes_callback_once() {
    let relay = CompletionRelay::new();
    let calls = register_counter(&relay);

    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
    relay.on_broadcast("bgdl.action.NOTIFICATION_CLICKED");
    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_replacing_callback_routes_to_newest_only() {
    let relay = CompletionRelay::new();
    let first_calls = register_counter(&relay);
    let second_calls = register_counter(&relay);

    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);

    assert_eq!(first_calls.load(Ordering::SeqCst), 0);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_relay_stays_armed_after_dispatch() {
    let relay = CompletionRelay::new();
    let calls = register_counter(&relay);

    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_callback_may_re_register_during_dispatch() {
    let relay = Arc::new(CompletionRelay::new());
    let replacement_calls = Arc::new(AtomicUsize::new(0));

    let relay_inner = Arc::clone(&relay);
    let counter = Arc::clone(&replacement_calls);
    relay.set_callback(Arc::new(move || {
        let counter = Arc::clone(&counter);
        relay_inner.set_callback(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    }));

    // First dispatch swaps in the replacement without deadlocking.
    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
    assert_eq!(replacement_calls.load(Ordering::SeqCst), 0);

    relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
    assert_eq!(replacement_calls.load(Ordering::SeqCst), 1);
}
