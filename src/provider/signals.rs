use super::CalendarProvider;
use chrono::{DateTime, Duration as ChronoDuration, Local, Months, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The two external change signals the tracker listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSignal {
    /// The provider's calendar data changed
    ProviderChanged,
    /// The local calendar day rolled over
    DayChanged,
}

/// Spawn the two signal producers and return the merged FIFO queue.
///
/// The provider-changed producer polls the provider and diffs event
/// snapshots; the day-changed producer ticks at local midnight. Both stop
/// when the token is cancelled or the receiver is dropped. Rapid repeats
/// may coalesce on the provider side; the consumer tolerates redundant
/// signals.
pub fn spawn_change_signals(
    provider: Arc<dyn CalendarProvider>,
    poll_interval: Duration,
    token: CancellationToken,
) -> mpsc::Receiver<ChangeSignal> {
    let (tx, rx) = mpsc::channel(32);

    let poll_tx = tx.clone();
    let poll_token = token.clone();
    tokio::spawn(async move {
        run_provider_poller(provider, poll_interval, poll_tx, poll_token).await;
    });

    tokio::spawn(async move {
        run_day_ticker(tx, token).await;
    });

    rx
}

async fn run_provider_poller(
    provider: Arc<dyn CalendarProvider>,
    poll_interval: Duration,
    tx: mpsc::Sender<ChangeSignal>,
    token: CancellationToken,
) {
    let mut last_snapshot: Option<Vec<String>> = None;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = sleep(poll_interval) => {}
        }

        let snapshot = match fetch_snapshot(provider.as_ref()).await {
            Some(snapshot) => snapshot,
            None => continue,
        };

        let changed = match &last_snapshot {
            Some(previous) => *previous != snapshot,
            // First successful poll only seeds the baseline; the tracker
            // already recomputed when observation started.
            None => false,
        };
        last_snapshot = Some(snapshot);

        if changed {
            debug!("Provider data changed");
            if tx.send(ChangeSignal::ProviderChanged).await.is_err() {
                break;
            }
        }
    }
}

/// Fingerprint of everything visible over the next month, across all sources
async fn fetch_snapshot(provider: &dyn CalendarProvider) -> Option<Vec<String>> {
    let now = Utc::now();
    let end = now.checked_add_months(Months::new(1))?;

    let sources = match provider.sources().await {
        Ok(sources) => sources,
        Err(e) => {
            warn!("Change check skipped, could not list sources: {}", e);
            return None;
        }
    };
    let source_ids: Vec<String> = sources.into_iter().map(|s| s.id).collect();

    let events = match provider.events_between(&source_ids, now, end).await {
        Ok(events) => events,
        Err(e) => {
            warn!("Change check skipped, could not query events: {}", e);
            return None;
        }
    };

    let mut fingerprint: Vec<String> = events
        .iter()
        .map(|event| serde_json::to_string(event).unwrap_or_default())
        .collect();
    fingerprint.sort();
    Some(fingerprint)
}

async fn run_day_ticker(tx: mpsc::Sender<ChangeSignal>, token: CancellationToken) {
    loop {
        let wait = match until_next_midnight(&Local::now()) {
            Some(wait) => wait,
            None => {
                warn!("Failed to compute next midnight, retrying in an hour");
                Duration::from_secs(3600)
            }
        };

        tokio::select! {
            _ = token.cancelled() => break,
            _ = sleep(wait) => {}
        }

        debug!("Calendar day changed");
        if tx.send(ChangeSignal::DayChanged).await.is_err() {
            break;
        }
    }
}

/// Time remaining until the next local midnight
pub fn until_next_midnight(now: &DateTime<Local>) -> Option<Duration> {
    let tomorrow = now
        .date_naive()
        .checked_add_signed(ChronoDuration::days(1))?;
    let midnight = tomorrow.and_hms_opt(0, 0, 0)?;

    let next = match Local.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earlier, _) => earlier,
        chrono::LocalResult::None => return None,
    };

    next.signed_duration_since(*now).to_std().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_next_midnight_bounds() {
        let now = Local::now();
        let wait = until_next_midnight(&now).unwrap();

        // Strictly in the future, never more than the longest local day
        // (25 hours on fall-back DST days)
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(25 * 3600));
    }
}
