use super::actor::TrackerCommand;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The single pending reminder timer.
///
/// A one-shot task that waits out the lead time and then posts
/// `TimerFired` back into the tracker's mailbox. Cancellation is
/// synchronous from the tracker's point of view: once `cancel` returns,
/// a late fire still carries a stale generation and the tracker ignores it.
#[derive(Debug)]
pub struct ReminderTimer {
    generation: u64,
    event_id: String,
    token: CancellationToken,
}

impl ReminderTimer {
    /// Schedule a fire after `wait`. A zero wait fires immediately.
    pub fn schedule(
        generation: u64,
        event_id: String,
        wait: Duration,
        command_tx: mpsc::Sender<TrackerCommand>,
    ) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!("Reminder timer {} cancelled", generation);
                }
                _ = sleep(wait) => {
                    let _ = command_tx.send(TrackerCommand::TimerFired(generation)).await;
                }
            }
        });

        Self {
            generation,
            event_id,
            token,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn cancel(self) {
        self.token.cancel();
    }
}
