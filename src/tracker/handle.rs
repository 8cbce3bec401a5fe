use super::actor::{TrackerCommand, TrackerSnapshot, UpcomingTracker};
use super::REMINDER_LEAD_SECS;
use crate::error::{AppResult, Error};
use crate::overlay::OverlayPresenter;
use crate::provider::{CalendarEvent, CalendarProvider};
use crate::selection::SelectionStore;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Handle for communicating with the tracker actor
#[derive(Clone)]
pub struct TrackerHandle {
    command_tx: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
    pub(super) fn new(command_tx: mpsc::Sender<TrackerCommand>) -> Self {
        Self { command_tx }
    }

    /// Spawn a tracker actor with the standard one-minute reminder lead
    pub fn spawn(
        provider: Arc<dyn CalendarProvider>,
        store: SelectionStore,
        presenter: Arc<dyn OverlayPresenter>,
        poll_interval: Duration,
    ) -> Self {
        Self::spawn_with_lead(
            provider,
            store,
            presenter,
            poll_interval,
            ChronoDuration::seconds(REMINDER_LEAD_SECS),
        )
    }

    /// Spawn a tracker actor with an explicit reminder lead time.
    ///
    /// Tests inject a short lead here; production code uses `spawn`.
    pub fn spawn_with_lead(
        provider: Arc<dyn CalendarProvider>,
        store: SelectionStore,
        presenter: Arc<dyn OverlayPresenter>,
        poll_interval: Duration,
        lead_time: ChronoDuration,
    ) -> Self {
        let (mut actor, handle) =
            UpcomingTracker::new(provider, store, presenter, poll_interval, lead_time);

        tokio::spawn(async move {
            actor.run().await;
        });

        handle
    }

    async fn send(&self, command: TrackerCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| Error::Other(format!("Tracker mailbox error: {}", e)))
    }

    /// Re-derive the upcoming event
    pub async fn recompute(&self) -> AppResult<()> {
        self.send(TrackerCommand::Recompute).await
    }

    /// Toggle a calendar source and return the upcoming event after the
    /// recompute that follows
    pub async fn toggle_source(&self, source_id: &str) -> AppResult<Option<CalendarEvent>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(TrackerCommand::ToggleSource(
            source_id.to_string(),
            response_tx,
        ))
        .await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| Error::Other("Response channel closed".to_string()))
    }

    /// Begin listening for external change signals
    pub async fn start_observing(&self) -> AppResult<()> {
        self.send(TrackerCommand::StartObserving).await
    }

    /// Stop listening for external change signals
    pub async fn stop_observing(&self) -> AppResult<()> {
        self.send(TrackerCommand::StopObserving).await
    }

    /// Present the overlay immediately; false when there is no upcoming event
    pub async fn show_overlay_now(&self) -> AppResult<bool> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(TrackerCommand::ShowOverlayNow(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| Error::Other("Response channel closed".to_string()))
    }

    /// Read-only view of the tracker state
    pub async fn snapshot(&self) -> AppResult<TrackerSnapshot> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(TrackerCommand::Snapshot(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| Error::Other("Response channel closed".to_string()))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(TrackerCommand::Shutdown).await;
        Ok(())
    }
}
