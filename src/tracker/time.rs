use crate::provider::models::CalendarEvent;
use chrono::{DateTime, Duration, Months, Utc};

/// End of the upcoming-event query window: one calendar month from now.
///
/// Calendar-component addition, not a fixed day count, so Jan 31 clamps to
/// the end of February rather than landing in March.
pub fn query_window_end(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    now.checked_add_months(Months::new(1))
}

/// When the reminder for an event should fire: start minus the lead time
pub fn reminder_fire_time(start: DateTime<Utc>, lead: Duration) -> Option<DateTime<Utc>> {
    start.checked_sub_signed(lead)
}

/// How long to wait until a fire time. A fire time already in the past
/// yields a zero wait, which means "fire immediately".
pub fn wait_until(now: DateTime<Utc>, fire_time: DateTime<Utc>) -> std::time::Duration {
    fire_time
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}

/// Pick the upcoming event among candidates: the earliest future start.
///
/// Events already in progress (start before now) are not upcoming. Ties on
/// identical starts break lexicographically by event id, which keeps the
/// answer deterministic regardless of provider ordering.
pub fn pick_upcoming(events: Vec<CalendarEvent>, now: DateTime<Utc>) -> Option<CalendarEvent> {
    events
        .into_iter()
        .filter(|event| event.start >= now)
        .min_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)))
}
