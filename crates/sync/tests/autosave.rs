//! Integration tests for the autosaving annotation synchronizer: debounced
//! persistence, coalescing, failure tolerance, and stale-response handling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::{advance, bag, record, settle, string_bag, MockStore};
use expedient_sync::ExtraDataSynchronizer;

fn store_with_records() -> MockStore {
    MockStore::new(vec![
        record("r1", &["a.pdf"]),
        record("r2", &["b.pdf"]),
    ])
}

// ---------------------------------------------------------------------------
// Test: an edit updates the bag immediately and persists once after 500ms
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn edit_is_visible_immediately_and_persists_after_the_settle_delay() {
    let store = Arc::new(store_with_records());
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;

    sync.set_field("Reviewed", json!("Yes"));

    // The in-memory bag is authoritative before any network traffic.
    assert_eq!(sync.bag().get("Reviewed"), Some(&json!("Yes")));
    assert_eq!(store.persist_count(), 0);

    advance(499).await;
    assert_eq!(store.persist_count(), 0);

    advance(1).await;
    assert_eq!(
        store.persisted(),
        vec![("r1".to_string(), string_bag(&[("Reviewed", "Yes")]))]
    );
}

// ---------------------------------------------------------------------------
// Test: rapid edits coalesce into a single trailing persist
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_persist_of_the_final_state() {
    let store = Arc::new(store_with_records());
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;

    sync.set_field("Notes", json!("d"));
    advance(200).await;
    sync.set_field("Notes", json!("dr"));
    advance(200).await;
    sync.set_field("Notes", json!("draft"));

    // Each edit re-armed the timer, so nothing has shipped yet.
    assert_eq!(store.persist_count(), 0);

    advance(500).await;
    assert_eq!(
        store.persisted(),
        vec![("r1".to_string(), string_bag(&[("Notes", "draft")]))]
    );
}

// ---------------------------------------------------------------------------
// Test: set then delete inside the window ships one bag without the field
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn set_then_delete_within_the_window_persists_without_the_field() {
    let store = Arc::new(store_with_records());
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;

    sync.set_field("Reviewed", json!("Yes"));
    sync.set_field("Score", json!(7));
    sync.delete_field("Score");

    advance(500).await;

    // One persist, carrying the surviving field only.
    assert_eq!(
        store.persisted(),
        vec![("r1".to_string(), string_bag(&[("Reviewed", "Yes")]))]
    );
}

// ---------------------------------------------------------------------------
// Test: deleting a field is "unset", not a stored null
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn deleted_field_is_absent_from_the_bag() {
    let store = Arc::new(
        store_with_records().with_bag("r1", bag(&[("Reviewed", json!("Yes"))])),
    );
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;
    assert!(sync.bag().contains("Reviewed"));

    sync.delete_field("Reviewed");
    assert!(!sync.bag().contains("Reviewed"));

    advance(500).await;
    let persisted = store.persisted();
    assert_eq!(persisted.len(), 1);
    assert!(persisted[0].1.is_empty());
}

// ---------------------------------------------------------------------------
// Test: a failed bag fetch falls open to an empty, editable bag
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn load_failure_leaves_an_empty_editable_bag() {
    let store = Arc::new(store_with_records().with_failing_bag_fetch("r1"));
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;

    assert!(sync.bag().is_empty());
    assert!(!sync.is_loading());

    // Editing still works and still persists.
    sync.set_field("Reviewed", json!("No"));
    advance(500).await;
    assert_eq!(store.persist_count(), 1);
}

// ---------------------------------------------------------------------------
// Test: a failed persist is swallowed; in-memory state stays authoritative
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn persist_failure_is_swallowed_and_the_bag_keeps_the_edit() {
    let store = Arc::new(store_with_records());
    store.set_fail_persist(true);
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;

    sync.set_field("Reviewed", json!("Yes"));
    advance(500).await;

    assert_eq!(store.persist_count(), 0);
    assert_eq!(sync.bag().get("Reviewed"), Some(&json!("Yes")));

    // The next edit retries with the full current bag.
    store.set_fail_persist(false);
    sync.set_field("Notes", json!("ok"));
    advance(500).await;
    assert_eq!(
        store.persisted(),
        vec![(
            "r1".to_string(),
            string_bag(&[("Notes", "ok"), ("Reviewed", "Yes")])
        )]
    );
}

// ---------------------------------------------------------------------------
// Test: a slow bag fetch for a superseded record cannot overwrite the
// active record's bag
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stale_bag_fetch_does_not_overwrite_the_active_record() {
    let store = Arc::new(
        store_with_records()
            .with_bag("r1", bag(&[("Reviewed", json!("Yes"))]))
            .with_bag("r2", bag(&[("Reviewed", json!("No"))]))
            .with_bag_delay("r1", Duration::from_millis(300)),
    );
    let sync = Arc::new(ExtraDataSynchronizer::new(store.clone()));

    // Start loading r1; its response is 300ms out.
    let slow = {
        let sync = Arc::clone(&sync);
        tokio::spawn(async move { sync.load("r1".to_string()).await })
    };
    settle().await;

    // Switch to r2 before r1's bag arrives.
    sync.load("r2".to_string()).await;
    assert_eq!(sync.bag().get("Reviewed"), Some(&json!("No")));

    // r1's response lands late and must be discarded.
    advance(300).await;
    slow.await.unwrap();
    assert_eq!(sync.active_record(), Some("r2".to_string()));
    assert_eq!(sync.bag().get("Reviewed"), Some(&json!("No")));
}

// ---------------------------------------------------------------------------
// Test: switching records cancels the previous record's pending persist
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn switching_records_cancels_the_pending_persist() {
    let store = Arc::new(store_with_records());
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;

    sync.set_field("Reviewed", json!("Yes"));
    advance(400).await;

    // Switch before the persist fires. The edit is abandoned with its record
    // context; nothing ships for r1.
    sync.load("r2".to_string()).await;
    advance(1000).await;
    assert_eq!(store.persist_count(), 0);

    // Edits against the new record persist normally.
    sync.set_field("Reviewed", json!("No"));
    advance(500).await;
    assert_eq!(store.persisted()[0].0, "r2");
}

// ---------------------------------------------------------------------------
// Test: the saving indicator toggles around a slow persist
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn saving_indicator_toggles_during_a_slow_persist() {
    let store = Arc::new(
        store_with_records().with_persist_delay(Duration::from_millis(200)),
    );
    let sync = ExtraDataSynchronizer::new(store.clone());
    sync.load("r1".to_string()).await;
    assert!(!sync.is_saving());

    sync.set_field("Reviewed", json!("Yes"));
    advance(500).await;

    // The persist request is now in flight.
    assert!(sync.is_saving());

    advance(200).await;
    assert!(!sync.is_saving());
    assert_eq!(store.persist_count(), 1);
}

// ---------------------------------------------------------------------------
// Test: edits with no active record are ignored
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn edits_without_an_active_record_are_ignored() {
    let store = Arc::new(store_with_records());
    let sync = ExtraDataSynchronizer::new(store.clone());

    sync.set_field("Reviewed", json!("Yes"));
    sync.delete_field("Reviewed");
    advance(1000).await;

    assert!(sync.bag().is_empty());
    assert_eq!(store.persist_count(), 0);
}
