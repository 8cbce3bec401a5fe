
use chrono::{Duration as ChronoDuration, Utc};
use provider_mock::{scripted_event, MockCalendarProvider, RecordingOverlay};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;
use upnext::selection::SelectionStore;
use upnext::tracker::TrackerHandle;

/// Spawn a tracker over the mocks with a short reminder lead and a poll
/// interval long enough to keep the change poller out of the way
fn spawn_tracker(
    provider: &MockCalendarProvider,
    overlay: &RecordingOverlay,
    dir: &TempDir,
    lead_ms: i64,
) -> TrackerHandle {
    TrackerHandle::spawn_with_lead(
        Arc::new(provider.clone()),
        SelectionStore::new(dir.path().join("selection.toml")),
        Arc::new(overlay.clone()),
        Duration::from_secs(3600),
        ChronoDuration::milliseconds(lead_ms),
    )
}

#[tokio::test]
async fn test_empty_selection_has_no_upcoming_event() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::minutes(10),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);
    tracker.recompute().await.unwrap();

    let snapshot = tracker.snapshot().await.unwrap();
    assert!(snapshot.selected.is_empty());
    assert!(snapshot.upcoming.is_none());

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_tracked_event_fires_reminder_before_start() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::milliseconds(400),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 200);
    let upcoming = tracker.toggle_source("work").await.unwrap();
    assert_eq!(upcoming.unwrap().id, "standup");

    // Fire time is start - 200ms, so the reminder lands well within this wait
    sleep(Duration::from_millis(900)).await;
    assert_eq!(overlay.shown_titles().await, vec!["Event standup"]);

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_closer_event_cancels_and_replaces_timer() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    let now = Utc::now();
    let far = scripted_event("work", "planning", now + ChronoDuration::seconds(60));
    provider.set_events(vec![far.clone()]).await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 100);
    let upcoming = tracker.toggle_source("work").await.unwrap();
    assert_eq!(upcoming.unwrap().id, "planning");

    // A closer event appears; the change signal would trigger this recompute
    let near = scripted_event("work", "incident", now + ChronoDuration::milliseconds(400));
    provider.set_events(vec![far, near]).await;
    tracker.recompute().await.unwrap();

    let snapshot = tracker.snapshot().await.unwrap();
    assert_eq!(snapshot.upcoming.unwrap().id, "incident");

    // Only the replacement timer fires; the 60s timer was cancelled
    sleep(Duration::from_millis(900)).await;
    assert_eq!(overlay.shown_titles().await, vec!["Event incident"]);

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_in_progress_events_are_not_upcoming() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    let now = Utc::now();
    provider
        .set_events(vec![
            // Started five minutes ago, still running
            scripted_event("work", "started", now - ChronoDuration::minutes(5)),
            scripted_event("work", "future", now + ChronoDuration::minutes(30)),
        ])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);
    let upcoming = tracker.toggle_source("work").await.unwrap();
    assert_eq!(upcoming.unwrap().id, "future");

    // With only the in-progress event left there is nothing upcoming
    provider
        .set_events(vec![scripted_event(
            "work",
            "started",
            now - ChronoDuration::minutes(5),
        )])
        .await;
    tracker.recompute().await.unwrap();
    assert!(tracker.snapshot().await.unwrap().upcoming.is_none());

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_past_fire_time_shows_overlay_immediately() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    // Event starts in 300ms but the lead is a full minute, so the fire
    // time is already in the past at scheduling time
    provider
        .set_events(vec![scripted_event(
            "work",
            "imminent",
            Utc::now() + ChronoDuration::milliseconds(300),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);
    tracker.toggle_source("work").await.unwrap();

    sleep(Duration::from_millis(250)).await;
    assert_eq!(overlay.shown_titles().await, vec!["Event imminent"]);

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_redundant_recompute_does_not_reschedule() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::milliseconds(500),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 200);
    tracker.toggle_source("work").await.unwrap();

    // Same identity: these must all be scheduling no-ops
    tracker.recompute().await.unwrap();
    tracker.recompute().await.unwrap();
    tracker.recompute().await.unwrap();

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(overlay.shown_titles().await.len(), 1);

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_toggle_twice_restores_selection_and_persists() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("selection.toml");

    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);

    tracker.toggle_source("work").await.unwrap();
    let snapshot = tracker.snapshot().await.unwrap();
    assert!(snapshot.selected.contains("work"));
    assert!(SelectionStore::new(&store_path).load().contains("work"));

    tracker.toggle_source("work").await.unwrap();
    let snapshot = tracker.snapshot().await.unwrap();
    assert!(snapshot.selected.is_empty());
    assert!(snapshot.upcoming.is_none());
    assert!(SelectionStore::new(&store_path).load().is_empty());

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_provider_failure_preserves_previous_answer() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::seconds(60),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 100);
    let upcoming = tracker.toggle_source("work").await.unwrap();
    assert_eq!(upcoming.unwrap().id, "standup");

    // A transient failure must not clear the tracked event
    provider.fail_queries(true);
    tracker.recompute().await.unwrap();

    let snapshot = tracker.snapshot().await.unwrap();
    assert_eq!(snapshot.upcoming.unwrap().id, "standup");

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_events_in_unselected_sources_are_ignored() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    provider
        .set_events(vec![scripted_event(
            "personal",
            "dentist",
            Utc::now() + ChronoDuration::minutes(10),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);
    let upcoming = tracker.toggle_source("work").await.unwrap();
    assert!(upcoming.is_none());

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stop_observing_leaves_pending_timer_armed() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::milliseconds(500),
        )])
        .await;

    let tracker = spawn_tracker(&provider, &overlay, &dir, 200);
    tracker.toggle_source("work").await.unwrap();

    tracker.start_observing().await.unwrap();
    assert!(tracker.snapshot().await.unwrap().observing);

    tracker.stop_observing().await.unwrap();
    assert!(!tracker.snapshot().await.unwrap().observing);

    // The reminder scheduled before stop_observing still fires
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(overlay.shown_titles().await, vec!["Event standup"]);

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_restarting_observation_recomputes_once_and_stays_single() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    // Long poll interval: every event query below is a recompute, never
    // the change poller
    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);

    tracker.toggle_source("work").await.unwrap();
    assert_eq!(provider.query_count(), 1);

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::seconds(60),
        )])
        .await;

    // Starting observation performs one immediate recompute
    tracker.start_observing().await.unwrap();
    let snapshot = tracker.snapshot().await.unwrap();
    assert!(snapshot.observing);
    assert_eq!(snapshot.upcoming.unwrap().id, "standup");
    assert_eq!(provider.query_count(), 2);

    // Restarting while observing stops the previous listener and
    // recomputes exactly once more
    tracker.start_observing().await.unwrap();
    let snapshot = tracker.snapshot().await.unwrap();
    assert!(snapshot.observing);
    assert_eq!(provider.query_count(), 3);

    // A leaked second listener or a doubled recompute would keep
    // querying; the count must stay put
    sleep(Duration::from_millis(300)).await;
    assert_eq!(provider.query_count(), 3);

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_observation_reacts_to_provider_changes() {
    let provider = MockCalendarProvider::new();
    provider.add_source("work", "Work").await;
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    // Short poll interval so the change poller actually runs in this test
    let tracker = TrackerHandle::spawn_with_lead(
        Arc::new(provider.clone()),
        SelectionStore::new(dir.path().join("selection.toml")),
        Arc::new(overlay.clone()),
        Duration::from_millis(100),
        ChronoDuration::seconds(60),
    );

    tracker.toggle_source("work").await.unwrap();
    tracker.start_observing().await.unwrap();

    // Let the poller seed its baseline snapshot first
    sleep(Duration::from_millis(250)).await;

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::seconds(60),
        )])
        .await;

    // The next poll emits a provider-changed signal and the tracker recomputes
    sleep(Duration::from_millis(600)).await;
    let snapshot = tracker.snapshot().await.unwrap();
    assert_eq!(snapshot.upcoming.unwrap().id, "standup");

    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_show_overlay_now_requires_upcoming_event() {
    let provider = MockCalendarProvider::new();
    let overlay = RecordingOverlay::new();
    let dir = tempfile::tempdir().unwrap();

    let tracker = spawn_tracker(&provider, &overlay, &dir, 60_000);

    // No upcoming event: the debug action no-ops
    assert!(!tracker.show_overlay_now().await.unwrap());
    assert!(overlay.shown_titles().await.is_empty());

    provider
        .set_events(vec![scripted_event(
            "work",
            "standup",
            Utc::now() + ChronoDuration::minutes(10),
        )])
        .await;
    tracker.toggle_source("work").await.unwrap();

    assert!(tracker.show_overlay_now().await.unwrap());
    assert_eq!(overlay.shown_titles().await, vec!["Event standup"]);

    tracker.shutdown().await.unwrap();
}
