use super::handle::TrackerHandle;
use super::time::{pick_upcoming, query_window_end, reminder_fire_time, wait_until};
use super::timer::ReminderTimer;
use crate::overlay::{OverlayContent, OverlayPresenter};
use crate::provider::signals::{spawn_change_signals, ChangeSignal};
use crate::provider::{CalendarEvent, CalendarProvider};
use crate::selection::SelectionStore;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Commands that can be sent to the tracker actor
pub enum TrackerCommand {
    /// Re-derive the upcoming event and reschedule the reminder if it changed
    Recompute,
    /// Toggle a calendar source in the selection, replying with the
    /// upcoming event after the recompute
    ToggleSource(String, mpsc::Sender<Option<CalendarEvent>>),
    /// Begin (or restart) listening for external change signals
    StartObserving,
    /// Stop listening for change signals; any pending reminder stays armed
    StopObserving,
    /// Posted by the reminder timer when its wait elapses
    TimerFired(u64),
    /// Debug action: present the overlay for the current upcoming event
    ShowOverlayNow(mpsc::Sender<bool>),
    /// Read-only view of the tracker state
    Snapshot(mpsc::Sender<TrackerSnapshot>),
    Shutdown,
}

/// Read-only view of the tracker state for the CLI surface
#[derive(Debug, Clone)]
pub struct TrackerSnapshot {
    pub selected: HashSet<String>,
    pub upcoming: Option<CalendarEvent>,
    pub observing: bool,
}

struct Observation {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

/// The upcoming-event tracker actor.
///
/// Owns all mutable reminder state: the selected calendar set, the current
/// upcoming event, the single pending reminder timer and the change-signal
/// listener. Commands are processed one at a time off the mailbox, so no
/// two recomputes ever interleave and a newer recompute always cancels the
/// older timer before scheduling its own.
pub struct UpcomingTracker {
    provider: Arc<dyn CalendarProvider>,
    store: SelectionStore,
    presenter: Arc<dyn OverlayPresenter>,
    selected: HashSet<String>,
    upcoming: Option<CalendarEvent>,
    timer: Option<ReminderTimer>,
    timer_generation: u64,
    observation: Option<Observation>,
    poll_interval: Duration,
    lead_time: ChronoDuration,
    command_rx: mpsc::Receiver<TrackerCommand>,
    command_tx: mpsc::Sender<TrackerCommand>,
}

impl UpcomingTracker {
    /// Create a new tracker and return its handle.
    ///
    /// The persisted selection is loaded eagerly; the in-memory set and the
    /// store only diverge if a write fails, and the store wins on restart.
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        store: SelectionStore,
        presenter: Arc<dyn OverlayPresenter>,
        poll_interval: Duration,
        lead_time: ChronoDuration,
    ) -> (Self, TrackerHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let selected = store.load();

        let actor = Self {
            provider,
            store,
            presenter,
            selected,
            upcoming: None,
            timer: None,
            timer_generation: 0,
            observation: None,
            poll_interval,
            lead_time,
            command_rx,
            command_tx: command_tx.clone(),
        };

        let handle = TrackerHandle::new(command_tx);

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Upcoming-event tracker started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                TrackerCommand::Recompute => {
                    self.recompute_upcoming_event().await;
                }
                TrackerCommand::ToggleSource(source_id, response_tx) => {
                    self.toggle_source(&source_id).await;
                    let _ = response_tx.send(self.upcoming.clone()).await;
                }
                TrackerCommand::StartObserving => {
                    self.start_observing().await;
                }
                TrackerCommand::StopObserving => {
                    self.stop_observing();
                }
                TrackerCommand::TimerFired(generation) => {
                    self.handle_timer_fired(generation).await;
                }
                TrackerCommand::ShowOverlayNow(response_tx) => {
                    let shown = self.show_overlay_now().await;
                    let _ = response_tx.send(shown).await;
                }
                TrackerCommand::Snapshot(response_tx) => {
                    let _ = response_tx
                        .send(TrackerSnapshot {
                            selected: self.selected.clone(),
                            upcoming: self.upcoming.clone(),
                            observing: self.observation.is_some(),
                        })
                        .await;
                }
                TrackerCommand::Shutdown => {
                    info!("Upcoming-event tracker shutting down");
                    self.stop_observing();
                    if let Some(timer) = self.timer.take() {
                        timer.cancel();
                    }
                    break;
                }
            }
        }

        info!("Upcoming-event tracker shut down");
    }

    /// Begin listening for provider-changed and day-changed signals.
    ///
    /// Restarting while already observing first stops the previous listener,
    /// then recomputes once before resuming.
    async fn start_observing(&mut self) {
        self.stop_observing();

        self.recompute_upcoming_event().await;

        let token = CancellationToken::new();
        let mut signal_rx =
            spawn_change_signals(Arc::clone(&self.provider), self.poll_interval, token.clone());

        let command_tx = self.command_tx.clone();
        let listener_token = token.clone();
        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = listener_token.cancelled() => break,
                    signal = signal_rx.recv() => {
                        let Some(signal) = signal else { break };
                        match signal {
                            ChangeSignal::ProviderChanged => debug!("Recomputing: provider data changed"),
                            ChangeSignal::DayChanged => debug!("Recomputing: day changed"),
                        }
                        if command_tx.send(TrackerCommand::Recompute).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.observation = Some(Observation { token, listener });
        info!("Calendar observation started");
    }

    /// Cancel the change-signal listener. The pending reminder timer is
    /// deliberately left armed. No-op when not observing.
    fn stop_observing(&mut self) {
        if let Some(observation) = self.observation.take() {
            observation.token.cancel();
            observation.listener.abort();
            info!("Calendar observation stopped");
        }
    }

    /// Toggle a source in the selection: persist first, then recompute.
    ///
    /// Persistence failures are logged and the in-memory change stands for
    /// this session.
    async fn toggle_source(&mut self, source_id: &str) {
        if self.selected.remove(source_id) {
            if let Err(e) = self.store.remove(source_id) {
                warn!("Failed to persist removal of {}: {}", source_id, e);
            }
            info!("Deselected calendar source {}", source_id);
        } else {
            self.selected.insert(source_id.to_string());
            if let Err(e) = self.store.add(source_id) {
                warn!("Failed to persist addition of {}: {}", source_id, e);
            }
            info!("Selected calendar source {}", source_id);
        }

        self.recompute_upcoming_event().await;
    }

    /// The core algorithm: fully re-derive the upcoming event and replace
    /// the reminder timer when its identity changed.
    async fn recompute_upcoming_event(&mut self) {
        let now = Utc::now();

        // A provider failure leaves the previous answer and timer untouched;
        // the next change signal retries.
        let Some(candidates) = self.fetch_candidates(now).await else {
            return;
        };

        let next = pick_upcoming(candidates, now);

        let unchanged = match (&self.upcoming, &next) {
            (None, None) => true,
            (Some(current), Some(candidate)) => current.same_identity(candidate),
            _ => false,
        };
        if unchanged {
            debug!("Upcoming event unchanged");
            return;
        }

        self.upcoming = next.clone();
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        match next {
            Some(event) => {
                info!("Upcoming event is now '{}' at {}", event.title, event.start);
                self.schedule_reminder(event);
            }
            None => {
                info!("No upcoming event");
            }
        }
    }

    /// Candidate events for the current query window, or None on a
    /// provider failure.
    async fn fetch_candidates(&self, now: chrono::DateTime<Utc>) -> Option<Vec<CalendarEvent>> {
        let Some(end) = query_window_end(now) else {
            warn!("Could not compute query window end, treating event list as empty");
            return Some(Vec::new());
        };

        if self.selected.is_empty() {
            return Some(Vec::new());
        }

        let mut source_ids: Vec<String> = self.selected.iter().cloned().collect();
        source_ids.sort();

        match self.provider.events_between(&source_ids, now, end).await {
            Ok(events) => Some(events),
            Err(e) => {
                warn!(
                    "Calendar query failed, keeping previous upcoming event: {}",
                    e
                );
                None
            }
        }
    }

    /// Arm the single reminder timer for an event. A fire time already in
    /// the past fires immediately.
    fn schedule_reminder(&mut self, event: CalendarEvent) {
        let Some(fire_time) = reminder_fire_time(event.start, self.lead_time) else {
            warn!(
                "Could not compute fire time for '{}', no reminder scheduled",
                event.title
            );
            return;
        };

        let wait = wait_until(Utc::now(), fire_time);
        self.timer_generation += 1;

        debug!(
            "Reminder for '{}' scheduled in {:?} (generation {})",
            event.title, wait, self.timer_generation
        );
        self.timer = Some(ReminderTimer::schedule(
            self.timer_generation,
            event.id,
            wait,
            self.command_tx.clone(),
        ));
    }

    /// A reminder timer elapsed. Stale generations lost a race against a
    /// cancellation and are ignored.
    async fn handle_timer_fired(&mut self, generation: u64) {
        let fired = match self.timer.take() {
            Some(timer) if timer.generation() == generation => timer,
            other => {
                self.timer = other;
                debug!("Ignoring stale reminder timer (generation {})", generation);
                return;
            }
        };

        let Some(event) = self.upcoming.clone() else {
            return;
        };
        if event.id != fired.event_id() {
            debug!(
                "Timer was bound to {} but {} is upcoming, not showing",
                fired.event_id(),
                event.id
            );
            return;
        }

        if let Err(e) = self.presenter.show(OverlayContent::for_event(&event)).await {
            warn!("Failed to present reminder overlay: {}", e);
        }
    }

    /// Debug action: show the overlay right away. Requires a current
    /// upcoming event, no-ops otherwise.
    async fn show_overlay_now(&self) -> bool {
        let Some(event) = &self.upcoming else {
            return false;
        };

        if let Err(e) = self.presenter.show(OverlayContent::for_event(event)).await {
            warn!("Failed to present reminder overlay: {}", e);
        }
        true
    }
}
